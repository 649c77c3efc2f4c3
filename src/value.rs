//! Conversions from posts and site settings into template [`Value`]s. Text
//! from front matter and configuration is HTML-escaped here because templates
//! insert values verbatim; post bodies are already HTML.

use crate::config::Config;
use crate::post::Post;
use gtmpl::Value;
use pulldown_cmark::escape::{escape_href, escape_html};
use std::collections::HashMap;

pub(crate) fn escaped_html(s: &str) -> Value {
    let mut out = String::with_capacity(s.len());
    // Writing into a `String` can't fail.
    let _ = escape_html(&mut out, s);
    Value::String(out)
}

pub(crate) fn escaped_href(s: &str) -> Value {
    let mut out = String::with_capacity(s.len());
    let _ = escape_href(&mut out, s);
    Value::String(out)
}

impl From<&Post> for Value {
    /// Converts a [`Post`] into a [`Value::Object`] with fields `slug`,
    /// `title`, `date`, `url` and `body`.
    fn from(post: &Post) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("slug".to_owned(), escaped_html(&post.slug));
        m.insert("title".to_owned(), escaped_html(&post.title));
        m.insert("date".to_owned(), escaped_html(&post.date));
        m.insert("url".to_owned(), escaped_href(&post.url));
        m.insert("body".to_owned(), Value::String(post.body.clone()));
        Value::Object(m)
    }
}

impl From<&Config> for Value {
    /// Converts the site-wide part of a [`Config`] into a [`Value::Object`]
    /// with fields `title`, `subtitle`, `description` and `base_path`.
    fn from(config: &Config) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), escaped_html(&config.title));
        m.insert("subtitle".to_owned(), escaped_html(&config.subtitle));
        m.insert("description".to_owned(), escaped_html(&config.description));
        m.insert("base_path".to_owned(), escaped_href(&config.base_path));
        Value::Object(m)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    fn field(value: &Value, name: &str) -> String {
        match value {
            Value::Object(m) => match m.get(name) {
                Some(Value::String(s)) => s.clone(),
                other => panic!("field `{}` isn't a string: {:?}", name, other),
            },
            other => panic!("not an object: {:?}", other),
        }
    }

    #[test]
    fn test_post_value_escapes_metadata_but_not_body() {
        let post = Post {
            slug: String::from("a b"),
            title: String::from("Fish & <Chips>"),
            date: String::from("2021-01-01"),
            url: String::from("/a b.html"),
            file_path: PathBuf::from("public/a b.html"),
            body: String::from("<p>hi</p>"),
        };
        let value = Value::from(&post);
        assert_eq!("Fish &amp; &lt;Chips&gt;", field(&value, "title"));
        assert_eq!("/a%20b.html", field(&value, "url"));
        assert_eq!("<p>hi</p>", field(&value, "body"));
    }
}
