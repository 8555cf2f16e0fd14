// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema declaration for the backup root.
//!
//! Declares the object types the HTTP layer exposes for introspection.
//! Kept by hand next to the model; plugins attach derived fields (such
//! as the thumbnail plugin's `thumbnail`) through their schema hooks.

use tankobon_core::{FieldSpec, ObjectType, SchemaRegistry};

/// Build the base schema for [`crate::model::Backup`].
pub fn backup_schema() -> SchemaRegistry {
    let mut schema = SchemaRegistry::new();

    let mut backup = ObjectType::new("Backup");
    backup
        .set_field("manga", FieldSpec::new("[Manga]"))
        .set_field("categories", FieldSpec::new("[Category]"))
        .set_field("sources", FieldSpec::new("[Source]"));
    schema.insert_type(backup);

    let mut manga = ObjectType::new("Manga");
    manga
        .set_field("source", FieldSpec::new("Int"))
        .set_field("url", FieldSpec::new("String"))
        .set_field("title", FieldSpec::new("String"))
        .set_field("thumbnailUrl", FieldSpec::new("String"))
        .set_field("status", FieldSpec::new("Int"))
        .set_field("chapters", FieldSpec::new("[Chapter]"))
        .set_field("history", FieldSpec::new("[History]"))
        .set_field(
            "totalChapters",
            FieldSpec::new("Int").with_description("number of known chapters"),
        )
        .set_field(
            "readChapters",
            FieldSpec::new("Int").with_description("number of chapters marked read"),
        )
        .set_field(
            "readingState",
            FieldSpec::new("String")
                .with_description("derived state: unread, reading, behind, caught_up, finished"),
        );
    schema.insert_type(manga);

    let mut chapter = ObjectType::new("Chapter");
    chapter
        .set_field("url", FieldSpec::new("String"))
        .set_field("name", FieldSpec::new("String"))
        .set_field("chapterNumber", FieldSpec::new("Float"))
        .set_field("read", FieldSpec::new("Boolean"))
        .set_field("dateFetch", FieldSpec::new("Int"));
    schema.insert_type(chapter);

    let mut category = ObjectType::new("Category");
    category
        .set_field("name", FieldSpec::new("String"))
        .set_field("order", FieldSpec::new("Int"));
    schema.insert_type(category);

    let mut source = ObjectType::new("Source");
    source
        .set_field("sourceId", FieldSpec::new("Int"))
        .set_field("name", FieldSpec::new("String"));
    schema.insert_type(source);

    let mut history = ObjectType::new("History");
    history
        .set_field("url", FieldSpec::new("String"))
        .set_field("lastRead", FieldSpec::new("Int"));
    schema.insert_type(history);

    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_all_model_types() {
        let schema = backup_schema();
        for name in ["Backup", "Manga", "Chapter", "Category", "Source", "History"] {
            assert!(schema.get(name).is_some(), "missing type {name}");
        }
    }

    #[test]
    fn manga_has_derived_fields() {
        let schema = backup_schema();
        let manga = schema.get("Manga").unwrap();
        assert!(manga.field("readingState").is_some());
        assert!(manga.field("thumbnail").is_none(), "thumbnail is plugin-attached");
    }
}
