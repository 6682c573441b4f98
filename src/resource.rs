//! Resource templates and query composition.
//!
//! Endpoints are described as path templates such as
//! `/projects/:id/pipelines/:pipeline_id`. [`resolve_template`] substitutes
//! the `:token` markers, [`merge_query`] folds query parameters into a parsed
//! [`Url`].

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

pub const GROUPS: &str = "/groups";
pub const PROJECT_HOOKS: &str = "/projects/:id/hooks";
pub const PROJECT_HOOK: &str = "/projects/:id/hooks/:hook_id";
pub const PIPELINE_CREATE: &str = "/projects/:id/pipeline";
pub const PIPELINES: &str = "/projects/:id/pipelines";
pub const PIPELINE: &str = "/projects/:id/pipelines/:pipeline_id";
pub const PIPELINE_JOBS: &str = "/projects/:id/pipelines/:pipeline_id/jobs";

/// Everything except RFC 3986 unreserved characters, so `/` and `:` inside a
/// value can never be mistaken for path structure or a placeholder. Values
/// that are empty, `.` or `..` are still path structure once parsed; see
/// [`is_path_value_allowed`].
const PATH_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// How [`merge_query`] treats keys that are already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Replace every existing value for the key.
    Set,
    /// Keep existing values and append.
    Add,
}

/// Replace every occurrence of each token with its value.
///
/// Tokens are applied in the order given. Tokens that appear in the template
/// but not in `params` are left untouched; see [`unresolved_placeholder`].
pub fn resolve_template(template: &str, params: &[(&str, &str)]) -> String {
    params
        .iter()
        .fold(template.to_string(), |path, (token, value)| {
            path.replace(token, value)
        })
}

/// Percent-encode a path parameter value (`group/project` → `group%2Fproject`).
pub fn encode_path_value(value: &str) -> String {
    utf8_percent_encode(value, PATH_VALUE).to_string()
}

/// False for values a URL parser would collapse as empty or dot segments.
pub fn is_path_value_allowed(value: &str) -> bool {
    !matches!(value, "" | "." | "..")
}

/// First `:token` segment still present in a resolved path, if any.
pub fn unresolved_placeholder(path: &str) -> Option<&str> {
    let path = path.split('?').next().unwrap_or(path);
    path.split('/').find(|segment| {
        segment
            .strip_prefix(':')
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    })
}

/// Merge `pairs` into the query component of `url`.
///
/// With [`QueryMode::Set`] a key never ends up duplicated: existing values
/// for it are dropped and the last value in `pairs` wins. With
/// [`QueryMode::Add`] every value is kept, in order.
pub fn merge_query<K, V>(url: &mut Url, pairs: &[(K, V)], mode: QueryMode)
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if pairs.is_empty() {
        return;
    }

    let mut merged: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    for (key, value) in pairs {
        let key = key.as_ref();
        if mode == QueryMode::Set {
            merged.retain(|(existing, _)| existing != key);
        }
        merged.push((key.to_string(), value.as_ref().to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(merged);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(url: &Url, key: &str) -> Vec<String> {
        url.query_pairs()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .collect()
    }

    #[test]
    fn replaces_every_occurrence() {
        let path = resolve_template("/a/:id/b/:id/c", &[(":id", "42")]);
        assert_eq!(path, "/a/42/b/42/c");
    }

    #[test]
    fn substitutes_multiple_tokens() {
        let path = resolve_template(PIPELINE_JOBS, &[(":id", "7"), (":pipeline_id", "99")]);
        assert_eq!(path, "/projects/7/pipelines/99/jobs");
    }

    #[test]
    fn hook_id_token_is_not_clobbered_by_id() {
        let path = resolve_template(PROJECT_HOOK, &[(":id", "3"), (":hook_id", "11")]);
        assert_eq!(path, "/projects/3/hooks/11");
    }

    #[test]
    fn unmapped_tokens_stay_literal() {
        let path = resolve_template(PIPELINE, &[(":id", "42")]);
        assert_eq!(path, "/projects/42/pipelines/:pipeline_id");
        assert_eq!(unresolved_placeholder(&path), Some(":pipeline_id"));
    }

    #[test]
    fn resolved_path_has_no_placeholder() {
        let path = resolve_template(PIPELINES, &[(":id", "42")]);
        assert_eq!(unresolved_placeholder(&path), None);
        assert_eq!(unresolved_placeholder("/a/b:c/d"), None);
        assert_eq!(unresolved_placeholder("/a/:/d"), None);
    }

    #[test]
    fn encodes_namespaced_project_path() {
        assert_eq!(encode_path_value("group/sub/project"), "group%2Fsub%2Fproject");
        assert_eq!(encode_path_value("my-proj_1.x~"), "my-proj_1.x~");
        assert_eq!(encode_path_value(":id"), "%3Aid");
    }

    #[test]
    fn dot_and_empty_values_are_not_allowed() {
        for value in ["", ".", ".."] {
            assert!(!is_path_value_allowed(value), "{value:?}");
        }
        for value in ["42", "...", ".hidden", "group/project"] {
            assert!(is_path_value_allowed(value), "{value:?}");
        }
    }

    #[test]
    fn set_replaces_existing_key() {
        let mut url = Url::parse("http://h/p?ref=old&keep=1").unwrap();
        merge_query(&mut url, &[("ref", "main")], QueryMode::Set);
        assert_eq!(values(&url, "ref"), vec!["main"]);
        assert_eq!(values(&url, "keep"), vec!["1"]);
    }

    #[test]
    fn set_last_value_wins() {
        let mut url = Url::parse("http://h/p").unwrap();
        merge_query(&mut url, &[("page", "1"), ("page", "2")], QueryMode::Set);
        assert_eq!(values(&url, "page"), vec!["2"]);
    }

    #[test]
    fn add_keeps_every_value() {
        let mut url = Url::parse("http://h/p?scope[]=failed").unwrap();
        merge_query(
            &mut url,
            &[("scope[]", "running"), ("scope[]", "pending")],
            QueryMode::Add,
        );
        assert_eq!(values(&url, "scope[]"), vec!["failed", "running", "pending"]);
    }

    #[test]
    fn values_are_percent_encoded() {
        let mut url = Url::parse("http://h/groups").unwrap();
        merge_query(&mut url, &[("search", "a b&c")], QueryMode::Set);
        assert_eq!(url.query(), Some("search=a+b%26c"));
        assert_eq!(values(&url, "search"), vec!["a b&c"]);
    }

    #[test]
    fn empty_pairs_leave_url_untouched() {
        let mut url = Url::parse("http://h/groups").unwrap();
        merge_query::<&str, &str>(&mut url, &[], QueryMode::Set);
        assert_eq!(url.as_str(), "http://h/groups");
    }
}
