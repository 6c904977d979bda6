pub const SCHEMA: &str = r#"
-- characters table
CREATE TABLE IF NOT EXISTS characters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    wiki_title TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    games TEXT NOT NULL DEFAULT '[]',
    mentions TEXT NOT NULL DEFAULT '[]',
    race TEXT NOT NULL DEFAULT '',
    gender TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT '',
    affiliation TEXT NOT NULL DEFAULT '[]',
    role TEXT NOT NULL DEFAULT '',
    titles TEXT NOT NULL DEFAULT '[]',
    main_game TEXT NOT NULL DEFAULT '',
    image_url TEXT NOT NULL DEFAULT '',
    played_at TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_characters_name ON characters(name);
CREATE INDEX IF NOT EXISTS idx_characters_main_game ON characters(main_game);
CREATE INDEX IF NOT EXISTS idx_characters_played_at ON characters(played_at);
"#;
