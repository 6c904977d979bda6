mod character;
mod game_code;

pub use character::Character;
pub use game_code::GameCode;
