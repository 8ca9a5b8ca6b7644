use std::fmt;

/// The dictionaries a document can be linked against.
///
/// Each kind owns one entity table and one link table. Table and column
/// names are static so they can be spliced into SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Author,
    Category,
    Keyword,
}

impl EntityKind {
    /// Linking order used by the upload pipeline.
    pub const ALL: [EntityKind; 3] = [Self::Author, Self::Category, Self::Keyword];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Category => "category",
            Self::Keyword => "keyword",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            Self::Author => "authors",
            Self::Category => "categories",
            Self::Keyword => "keywords",
        }
    }

    pub fn link_table(self) -> &'static str {
        match self {
            Self::Author => "document_authors",
            Self::Category => "document_categories",
            Self::Keyword => "document_keywords",
        }
    }

    pub fn link_column(self) -> &'static str {
        match self {
            Self::Author => "author_id",
            Self::Category => "category_id",
            Self::Keyword => "keyword_id",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
