use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    General,
    Hardware,
    Email,
    Transfer,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::General,
        Category::Hardware,
        Category::Email,
        Category::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Hardware => "hardware",
            Category::Email => "email",
            Category::Transfer => "transfer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::General => "General Requests",
            Category::Hardware => "Hardware Requests",
            Category::Email => "Email Requests",
            Category::Transfer => "Transfer Requests",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "general" => Some(Category::General),
            "hardware" => Some(Category::Hardware),
            "email" => Some(Category::Email),
            "transfer" => Some(Category::Transfer),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which server-side list a cached result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    All,
    Progress,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::All => "all",
            View::Progress => "progress",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub category: Category,
    pub view: View,
}

impl QueryKey {
    pub fn new(category: Category, view: View) -> Self {
        Self { category, view }
    }

    pub fn all(category: Category) -> Self {
        Self::new(category, View::All)
    }

    pub fn progress(category: Category) -> Self {
        Self::new(category, View::Progress)
    }

    pub fn as_string(&self) -> String {
        format!("{}/{}", self.category.as_str(), self.view.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_case_insensitively() {
        assert_eq!(Category::from_str("general"), Some(Category::General));
        assert_eq!(Category::from_str(" HARDWARE "), Some(Category::Hardware));
        assert_eq!(Category::from_str("Transfer"), Some(Category::Transfer));
        assert_eq!(Category::from_str("faqs"), None);
    }

    #[test]
    fn query_key_matches_endpoint_layout() {
        assert_eq!(QueryKey::progress(Category::Email).as_string(), "email/progress");
        assert_eq!(QueryKey::all(Category::General).as_string(), "general/all");
    }
}
