/// Resolve an image path against the images base URL.
///
/// Absolute URLs are returned as-is; relative paths are joined onto the
/// base. `None` when neither parses.
pub fn resolve_image_url(image_url: &str, base_url: &str) -> Option<String> {
    if url::Url::parse(image_url).is_ok() {
        return Some(image_url.to_string());
    }

    let base = url::Url::parse(base_url).ok()?;
    base.join(image_url).ok().map(|resolved| resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_and_absolute_images() {
        let base = "https://images.example.com/media/";
        assert_eq!(
            resolve_image_url("pollo.png", base).as_deref(),
            Some("https://images.example.com/media/pollo.png")
        );
        assert_eq!(
            resolve_image_url("https://cdn.example.com/a.png", base).as_deref(),
            Some("https://cdn.example.com/a.png")
        );
        assert_eq!(resolve_image_url("pollo.png", "not a url"), None);
    }
}
