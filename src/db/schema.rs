/// Schema for the Pokédex cache database.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cached_pokemon (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    image_url TEXT NOT NULL,
    types TEXT NOT NULL,
    weight REAL NOT NULL,
    height REAL NOT NULL,
    hp INTEGER NOT NULL,
    attack INTEGER NOT NULL,
    defense INTEGER NOT NULL,
    special_attack INTEGER NOT NULL,
    special_defense INTEGER NOT NULL,
    speed INTEGER NOT NULL,
    last_fetched_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_cached_pokemon_fetched
    ON cached_pokemon(last_fetched_at);

CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;
