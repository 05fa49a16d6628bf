//! DDL for the content tables. Statements are idempotent so `migrate` can be
//! re-run against an existing database.

pub const STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS "users" (
        "id" BIGSERIAL PRIMARY KEY,
        "username" TEXT NOT NULL UNIQUE,
        "password_hash" TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "posts" (
        "id" BIGSERIAL PRIMARY KEY,
        "title" TEXT NOT NULL,
        "body" TEXT NOT NULL,
        "user_id" BIGINT NULL REFERENCES "users" ("id") ON DELETE SET NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "comments" (
        "id" BIGSERIAL PRIMARY KEY,
        "name" TEXT NOT NULL,
        "email" TEXT NOT NULL,
        "body" TEXT NOT NULL,
        "post_id" BIGINT NOT NULL REFERENCES "posts" ("id") ON DELETE CASCADE
    )"#,
    r#"CREATE INDEX IF NOT EXISTS "comments_post_id_idx" ON "comments" ("post_id")"#,
    r#"CREATE TABLE IF NOT EXISTS "albums" (
        "id" BIGSERIAL PRIMARY KEY,
        "title" TEXT NOT NULL,
        "user_id" BIGINT NULL REFERENCES "users" ("id") ON DELETE SET NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "photos" (
        "id" BIGSERIAL PRIMARY KEY,
        "title" TEXT NOT NULL,
        "url" TEXT NOT NULL,
        "thumbnail_url" TEXT NOT NULL,
        "album_id" BIGINT NOT NULL REFERENCES "albums" ("id") ON DELETE CASCADE
    )"#,
    r#"CREATE INDEX IF NOT EXISTS "photos_album_id_idx" ON "photos" ("album_id")"#,
];
