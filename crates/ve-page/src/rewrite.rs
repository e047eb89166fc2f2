//! Link and asset rewriting.
//!
//! Relative hyperlinks, media sources, and legacy `<param>` URLs are turned
//! into URLs that resolve without knowing where the essay came from.

use ve_renderer::{Document, NodeId};
use ve_source::{DEFAULT_RAW_URL, Github, Source};

use crate::context::RenderContext;

const BADGE: &str = "ve-button.png";
const FALLBACK_BRANCH: &str = "main";

/// Rewrite every link and source in `doc` in place.
pub fn rewrite(doc: &mut Document, source: &Source, ctx: &RenderContext, github: &dyn Github) {
    let root = doc.root();
    remove_badges(doc, root);
    if source.is_github() {
        rewrite_links(doc, root, source, ctx);
    }
    rewrite_sources(doc, root, source, ctx);
    rewrite_params(doc, root, source, ctx, github);
}

/// Drop "view as visual essay" badges together with their wrapper.
fn remove_badges(doc: &mut Document, root: NodeId) {
    let badges = doc.find_all(root, |e| e.name == "img" && e.attr("src").is_some_and(|s| s.contains(BADGE)));
    for img in badges {
        match doc.parent(img) {
            Some(parent) if !doc.is_element(parent, "body") => doc.detach(parent),
            _ => doc.detach(img),
        }
    }
}

/// Path segments of a base URL, ignoring scheme, host, query and fragment.
fn base_path_segments(base_url: &str) -> Vec<&str> {
    let path = match base_url.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map_or("", |(_, path)| path),
        None => base_url,
    };
    path.split(['?', '#'])
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

/// Links the hyperlink rule never touches.
fn is_external(href: &str) -> bool {
    href.is_empty()
        || href.starts_with('#')
        || href.starts_with("//")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.contains("://")
}

fn with_ref(href: &str, git_ref: Option<&str>) -> String {
    match git_ref {
        Some(r) if !href.contains("ref=") => {
            let sep = if href.contains('?') { '&' } else { '?' };
            format!("{href}{sep}ref={r}")
        }
        _ => href.to_owned(),
    }
}

fn link_base(source: &Source, ctx: &RenderContext) -> String {
    let account = source.account.as_deref().unwrap_or_default();
    let repo = source.repo.as_deref().unwrap_or_default();
    if ctx.ghp {
        return format!("/{repo}/");
    }
    let segments = base_path_segments(&ctx.base_url);
    if segments.len() >= 2 && (segments[0] != account || segments[1] != repo) {
        "/".to_owned()
    } else {
        format!("/{account}/{repo}/")
    }
}

fn rewrite_links(doc: &mut Document, root: NodeId, source: &Source, ctx: &RenderContext) {
    let base = link_base(source, ctx);
    // `ve-style` hrefs are storage paths resolved at assembly time.
    for el in doc.find_all(root, |e| e.has_attr("href") && e.name != "ve-style") {
        let Some(href) = doc.attr(el, "href").map(str::to_owned) else {
            continue;
        };
        if is_external(&href) {
            continue;
        }
        let converted = match href.strip_prefix('/') {
            Some(rest) => with_ref(&format!("{base}{rest}"), ctx.git_ref.as_deref()),
            None => with_ref(&href, ctx.git_ref.as_deref()),
        };
        tracing::debug!(from = %href, to = %converted, "Rewrote link");
        doc.set_attr(el, "href", converted);
    }
}

/// Resolve a relative `src` against a GitHub page base URL.
///
/// The base URL is `{scheme}://{host}/{account}/{repo}/{ref}/{dirs...}/{page}`;
/// its directory part is `split('/')[6..len-1]`. Each leading `..` in `src`
/// drops one directory. A root-relative `src` starts at the repository root.
fn github_src_path(base_url: &str, src: &str) -> String {
    let base: Vec<&str> = base_url.split('/').collect();
    let dirs: &[&str] = if base.len() > 7 { &base[6..base.len() - 1] } else { &[] };

    let rooted = src.starts_with('/');
    let src = src.strip_prefix("./").unwrap_or(src);
    let parts: Vec<&str> = src.split('/').filter(|s| !s.is_empty()).collect();
    let up = parts.iter().take_while(|p| **p == "..").count();

    let mut path: Vec<&str> = if rooted {
        Vec::new()
    } else {
        dirs[..dirs.len().saturating_sub(up)].to_vec()
    };
    path.extend_from_slice(&parts[up..]);
    path.join("/")
}

fn rewrite_sources(doc: &mut Document, root: NodeId, source: &Source, ctx: &RenderContext) {
    let targets = doc.find_all(root, |e| e.has_attr("src") && !e.name.starts_with("ve-"));
    for el in targets {
        let Some(src) = doc.attr(el, "src").map(str::to_owned) else {
            continue;
        };
        if src.starts_with("http") || src.starts_with("data:") || src.starts_with("//") {
            continue;
        }

        let converted = if source.is_github() {
            format!(
                "{DEFAULT_RAW_URL}/{}/{}/{}/{}",
                source.account.as_deref().unwrap_or_default(),
                source.repo.as_deref().unwrap_or_default(),
                source.git_ref.as_deref().unwrap_or(FALLBACK_BRANCH),
                github_src_path(&ctx.base_url, &src)
            )
        } else if let Some(rest) = src.strip_prefix('/') {
            format!("{}/{rest}", ctx.base_url.trim_end_matches('/'))
        } else {
            continue;
        };
        tracing::debug!(from = %src, to = %converted, "Rewrote source");
        doc.set_attr(el, "src", converted);
    }
}

/// Account, repo and ref that legacy `<param>` paths resolve against.
fn param_repo(source: &Source, ctx: &RenderContext, github: &dyn Github) -> Option<(String, String, String)> {
    if source.is_github() {
        return Some((
            source.account.clone()?,
            source.repo.clone()?,
            source.git_ref.clone().unwrap_or_else(|| FALLBACK_BRANCH.to_owned()),
        ));
    }
    let prefix = ctx.prefix.as_deref()?;
    let mut segments = prefix.split('/').filter(|s| !s.is_empty());
    let (account, repo) = (segments.next()?, segments.next()?);
    let git_ref = github
        .default_branch(account, repo)
        .unwrap_or_else(|| FALLBACK_BRANCH.to_owned());
    Some((account.to_owned(), repo.to_owned(), git_ref))
}

fn rewrite_params(doc: &mut Document, root: NodeId, source: &Source, ctx: &RenderContext, github: &dyn Github) {
    let params = doc.elements_named(root, "param");
    if params.is_empty() {
        return;
    }
    let Some((account, repo, git_ref)) = param_repo(source, ctx, github) else {
        tracing::debug!(prefix = ?ctx.prefix, "No repository for legacy params");
        return;
    };

    let base = format!("/{account}/{repo}/{git_ref}");
    let segments = base_path_segments(&ctx.base_url);
    let start = if segments.len() >= 2 && segments[0] == account && segments[1] == repo {
        2
    } else {
        0
    };
    let end = segments.len().saturating_sub(1);
    let dirs = if start < end { segments[start..end].join("/") } else { String::new() };

    for el in params {
        for field in ["url", "banner"] {
            let Some(value) = doc.attr(el, field).map(str::to_owned) else {
                continue;
            };
            if value.starts_with("http") {
                continue;
            }
            let path = if value.starts_with('/') {
                format!("{base}{value}")
            } else if dirs.is_empty() {
                format!("{base}/{value}")
            } else {
                format!("{base}/{dirs}/{value}")
            };
            let converted = format!("{DEFAULT_RAW_URL}{path}");
            tracing::debug!(field, from = %value, to = %converted, "Rewrote param");
            doc.set_attr(el, field, converted);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ve_config::Env;
    use ve_source::MockGithub;

    use super::*;

    fn ctx(base_url: &str, prefix: Option<&str>, git_ref: Option<&str>) -> RenderContext {
        RenderContext {
            env: Env::Prod,
            host: "example.org".to_owned(),
            base_url: base_url.to_owned(),
            prefix: prefix.map(str::to_owned),
            git_ref: git_ref.map(str::to_owned),
            inline: false,
            ghp: false,
        }
    }

    fn github_source() -> Source {
        Source::from_github("acme", "docs", "main", "essays/intro.md", "")
    }

    fn storage_source() -> Source {
        Source::from_storage("demo/content/essay.md", "demo/content/essay.md", "")
    }

    fn run(html: &str, source: &Source, ctx: &RenderContext) -> String {
        let mut doc = Document::parse(html);
        rewrite(&mut doc, source, ctx, &MockGithub::new().with_repo("demo", "content", "develop"));
        doc.inner_html(doc.body().unwrap())
    }

    #[test]
    fn test_github_relative_image() {
        let html = run(
            r#"<img src="./img/a.png">"#,
            &github_source(),
            &ctx("https://visual-essays.net/acme/docs/main/essay", None, None),
        );

        assert_eq!(html, r#"<img src="https://raw.githubusercontent.com/acme/docs/main/img/a.png">"#);
    }

    #[test]
    fn test_github_parent_segments_trim_base() {
        let base = "https://visual-essays.net/acme/docs/main/essays/part1/page";

        assert_eq!(
            github_src_path(base, "../img/a.png"),
            "essays/img/a.png"
        );
        assert_eq!(github_src_path(base, "img/a.png"), "essays/part1/img/a.png");
        assert_eq!(github_src_path(base, "/img/a.png"), "img/a.png");
        assert_eq!(github_src_path(base, "../../../x.png"), "x.png");
    }

    #[test]
    fn test_github_root_link_under_repo() {
        let html = run(
            r#"<a href="/essays/two">Two</a>"#,
            &github_source(),
            &ctx("/acme/docs/essays/one", None, Some("dev")),
        );

        assert_eq!(html, r#"<a href="/acme/docs/essays/two?ref=dev">Two</a>"#);
    }

    #[test]
    fn test_github_root_link_other_repo_goes_to_root() {
        let html = run(
            r#"<a href="/essays/two">Two</a>"#,
            &github_source(),
            &ctx("https://visual-essays.net/other/site/page", None, None),
        );

        assert_eq!(html, r#"<a href="/essays/two">Two</a>"#);
    }

    #[test]
    fn test_github_pages_mode() {
        let mut context = ctx("/", None, None);
        context.ghp = true;

        let html = run(r#"<a href="/essays/two">Two</a>"#, &github_source(), &context);

        assert_eq!(html, r#"<a href="/docs/essays/two">Two</a>"#);
    }

    #[test]
    fn test_relative_link_gains_ref_once() {
        let html = run(
            r##"<a href="two">2</a><a href="three?ref=x">3</a><a href="#top">t</a><a href="mailto:a@b.c">m</a>"##,
            &github_source(),
            &ctx("/", None, Some("dev")),
        );

        assert_eq!(
            html,
            r##"<a href="two?ref=dev">2</a><a href="three?ref=x">3</a><a href="#top">t</a><a href="mailto:a@b.c">m</a>"##
        );
    }

    #[test]
    fn test_stylesheet_reference_left_as_written() {
        let html = run(
            r#"<ve-style href="/custom.css"></ve-style><ve-style href="theme.css"></ve-style>"#,
            &github_source(),
            &ctx("https://visual-essays.net/acme/docs/main/", None, Some("dev")),
        );

        assert_eq!(
            html,
            r#"<ve-style href="/custom.css"></ve-style><ve-style href="theme.css"></ve-style>"#
        );
    }

    #[test]
    fn test_storage_links_untouched_and_root_src_prefixed() {
        let html = run(
            r#"<a href="/essay2">e</a><img src="/images/a.jpg"><img src="b.jpg">"#,
            &storage_source(),
            &ctx("https://visual-essays.net/", None, Some("dev")),
        );

        assert_eq!(
            html,
            r#"<a href="/essay2">e</a><img src="https://visual-essays.net/images/a.jpg"><img src="b.jpg">"#
        );
    }

    #[test]
    fn test_root_src_joined_without_trailing_slash() {
        let html = run(
            r#"<img src="/images/a.jpg">"#,
            &storage_source(),
            &ctx("https://visual-essays.net", None, None),
        );

        assert_eq!(html, r#"<img src="https://visual-essays.net/images/a.jpg">"#);
    }

    #[test]
    fn test_absolute_and_component_sources_untouched() {
        let html = r#"<img src="https://x.org/a.jpg"><ve-image src="wc:a.jpg"></ve-image>"#;

        assert_eq!(run(html, &github_source(), &ctx("/", None, None)), html);
    }

    #[test]
    fn test_rewrite_is_idempotent_on_absolute_urls() {
        let source = github_source();
        let context = ctx("https://visual-essays.net/acme/docs/main/essay", None, Some("main"));
        let once = run(r#"<img src="img/a.png"><a href="https://x.org/">x</a>"#, &source, &context);

        assert_eq!(run(&once, &source, &context), once);
    }

    #[test]
    fn test_badge_removed_with_parent() {
        let html = run(
            r#"<p><a href="https://visual-essays.net"><img src="https://x.org/ve-button.png"></a></p><p>kept</p>"#,
            &storage_source(),
            &ctx("/", None, None),
        );

        assert_eq!(html, "<p></p><p>kept</p>");
    }

    #[test]
    fn test_params_from_storage_prefix() {
        let html = run(
            r#"<param ve-entity url="images/a.jpg" banner="/b.jpg"><param url="https://x.org/c.jpg">"#,
            &storage_source(),
            &ctx("https://visual-essays.net/essays/one", Some("demo/content"), None),
        );

        assert_eq!(
            html,
            concat!(
                r#"<param ve-entity="" url="https://raw.githubusercontent.com/demo/content/develop/essays/images/a.jpg" "#,
                r#"banner="https://raw.githubusercontent.com/demo/content/develop/b.jpg">"#,
                r#"<param url="https://x.org/c.jpg">"#
            )
        );
    }

    #[test]
    fn test_params_strip_matching_repo_from_base() {
        let html = run(
            r#"<param url="a.jpg">"#,
            &github_source(),
            &ctx("/acme/docs/essays/one", None, None),
        );

        assert_eq!(
            html,
            r#"<param url="https://raw.githubusercontent.com/acme/docs/main/essays/a.jpg">"#
        );
    }

    #[test]
    fn test_params_without_repo_left_alone() {
        let html = r#"<param url="a.jpg">"#;

        assert_eq!(run(html, &storage_source(), &ctx("/", Some("solo"), None)), html);
    }
}
