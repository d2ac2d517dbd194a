//! Remote operations as method + path pairs.

use std::fmt;

/// HTTP methods used by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Upper-case method name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Fetch the full list.
    List,
    /// Replace the full list.
    Update,
    /// Fetch one item.
    Get(String),
    /// Create one item.
    Add,
    /// Replace one item.
    Edit(String),
    /// Delete one item.
    Remove(String),
}

impl Endpoint {
    /// HTTP method of the operation.
    pub const fn method(&self) -> HttpMethod {
        match self {
            Endpoint::List | Endpoint::Get(_) => HttpMethod::Get,
            Endpoint::Update => HttpMethod::Patch,
            Endpoint::Add => HttpMethod::Post,
            Endpoint::Edit(_) => HttpMethod::Put,
            Endpoint::Remove(_) => HttpMethod::Delete,
        }
    }

    /// Path relative to the service base URL.
    pub fn path(&self) -> String {
        match self {
            Endpoint::List | Endpoint::Update | Endpoint::Add => "list".to_string(),
            Endpoint::Get(id) | Endpoint::Edit(id) | Endpoint::Remove(id) => {
                format!("list/{id}")
            }
        }
    }

    /// Absolute URL under `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.path())
    }

    /// Whether the response carries `list` rather than `element`.
    pub const fn returns_list(&self) -> bool {
        matches!(self, Endpoint::List | Endpoint::Update)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_and_paths() {
        let cases = [
            (Endpoint::List, "GET", "list"),
            (Endpoint::Update, "PATCH", "list"),
            (Endpoint::Get("a".into()), "GET", "list/a"),
            (Endpoint::Add, "POST", "list"),
            (Endpoint::Edit("b".into()), "PUT", "list/b"),
            (Endpoint::Remove("c".into()), "DELETE", "list/c"),
        ];
        for (endpoint, method, path) in cases {
            assert_eq!(endpoint.method().as_str(), method);
            assert_eq!(endpoint.path(), path);
        }
    }

    #[test]
    fn url_joins_without_double_slash() {
        assert_eq!(
            Endpoint::Get("x".into()).url("https://example.com/todo/"),
            "https://example.com/todo/list/x"
        );
        assert_eq!(Endpoint::List.to_string(), "GET list");
        assert!(Endpoint::Update.returns_list());
        assert!(!Endpoint::Add.returns_list());
    }
}
