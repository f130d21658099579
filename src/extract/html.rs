//! HTML extractor: tags, the stateful `<source>` attribute key, optional
//! comment brute-forcing, and nested JS/CSS scanning of inline `<script>`/`<style>`.
//!
//! Built on `lol_html`'s streaming rewriter, used purely as a scanning tokenizer — the
//! rewritten output is discarded; only the element/text callbacks' side effects matter.

use super::{css, js, tag_allowed, DiscoveryKind};
use crate::url_util::normalize;
use lol_html::{doc_comments, element, text, rewrite_str, RewriteStrSettings};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use url::Url;

/// Flags controlling optional extraction behavior, mirroring [`crate::config::CrawlConfig`]'s
/// relevant fields.
#[derive(Debug, Clone, Default)]
pub struct HtmlFlags {
    pub brute: bool,
    pub scan_js: bool,
    pub scan_css: bool,
    pub tag_filter: Vec<String>,
}

const KEY_SRC: &str = "src";
const KEY_SRCSET: &str = "srcset";

/// Extract links from an HTML document, calling `sink(kind, url)` for each. Malformed
/// or javascript-scheme targets are silently suppressed by [`normalize`].
pub fn extract_html(bytes: &[u8], base: &Url, flags: &HtmlFlags, sink: impl FnMut(DiscoveryKind, String)) {
    let input = String::from_utf8_lossy(bytes);
    let sink = Rc::new(RefCell::new(sink));
    let source_key: Rc<Cell<&'static str>> = Rc::new(Cell::new(KEY_SRC));
    let script_has_src = Rc::new(Cell::new(false));

    let emit = {
        let sink = Rc::clone(&sink);
        move |kind: DiscoveryKind, raw: &str, base: &Url| {
            if raw.is_empty() {
                return;
            }
            if let Some(url) = normalize(base, raw) {
                (sink.borrow_mut())(kind, url);
            }
        }
    };

    let base_a = base.clone();
    let emit_a = emit.clone();
    let filter_a = flags.tag_filter.clone();
    let anchor_handler = element!("a[href], link[href]", move |el| {
        if tag_allowed(&filter_a, &el.tag_name()) {
            if let Some(href) = el.get_attribute("href") {
                emit_a(DiscoveryKind::Anchor, &href, &base_a);
            }
        }
        Ok(())
    });

    let base_b = base.clone();
    let emit_b = emit.clone();
    let filter_b = flags.tag_filter.clone();
    let static_src_handler = element!("img[src], image[src], track[src]", move |el| {
        if tag_allowed(&filter_b, &el.tag_name()) {
            if let Some(src) = el.get_attribute("src") {
                let tag = leak_tag(&el.tag_name());
                emit_b(DiscoveryKind::Static(tag), &src, &base_b);
            }
        }
        Ok(())
    });

    let base_c = base.clone();
    let emit_c = emit.clone();
    let filter_c = flags.tag_filter.clone();
    let iframe_handler = element!("iframe[src]", move |el| {
        if tag_allowed(&filter_c, &el.tag_name()) {
            if let Some(src) = el.get_attribute("src") {
                emit_c(DiscoveryKind::Iframe, &src, &base_c);
            }
        }
        Ok(())
    });

    let base_d = base.clone();
    let emit_d = emit.clone();
    let filter_d = flags.tag_filter.clone();
    let script_has_src_a = Rc::clone(&script_has_src);
    let script_handler = element!("script", move |el| {
        let allowed = tag_allowed(&filter_d, &el.tag_name());
        let has_src = el.get_attribute("src").is_some();
        script_has_src_a.set(has_src);
        if allowed {
            if let Some(src) = el.get_attribute("src") {
                emit_d(DiscoveryKind::Script, &src, &base_d);
            }
        }
        Ok(())
    });

    let base_e = base.clone();
    let emit_e = emit.clone();
    let filter_e = flags.tag_filter.clone();
    let form_handler = element!("form[action]", move |el| {
        if tag_allowed(&filter_e, &el.tag_name()) {
            if let Some(action) = el.get_attribute("action") {
                emit_e(DiscoveryKind::Static("form"), &action, &base_e);
            }
        }
        Ok(())
    });

    let base_f = base.clone();
    let emit_f = emit.clone();
    let filter_f = flags.tag_filter.clone();
    let object_handler = element!("object[data]", move |el| {
        if tag_allowed(&filter_f, &el.tag_name()) {
            if let Some(data) = el.get_attribute("data") {
                emit_f(DiscoveryKind::Static("object"), &data, &base_f);
            }
        }
        Ok(())
    });

    let base_g = base.clone();
    let emit_g = emit.clone();
    let filter_g = flags.tag_filter.clone();
    let key_g = Rc::clone(&source_key);
    let video_handler = element!("video", move |el| {
        if tag_allowed(&filter_g, &el.tag_name()) {
            if let Some(poster) = el.get_attribute("poster") {
                emit_g(DiscoveryKind::Static("video"), &poster, &base_g);
            }
            if let Some(src) = el.get_attribute("src") {
                emit_g(DiscoveryKind::Static("video"), &src, &base_g);
            }
        }
        key_g.set(KEY_SRC);
        Ok(())
    });

    let base_h = base.clone();
    let emit_h = emit.clone();
    let filter_h = flags.tag_filter.clone();
    let key_h = Rc::clone(&source_key);
    let audio_handler = element!("audio", move |el| {
        if tag_allowed(&filter_h, &el.tag_name()) {
            if let Some(src) = el.get_attribute("src") {
                emit_h(DiscoveryKind::Static("audio"), &src, &base_h);
            }
        }
        key_h.set(KEY_SRC);
        Ok(())
    });

    let key_i = Rc::clone(&source_key);
    let picture_handler = element!("picture", move |_el| {
        key_i.set(KEY_SRCSET);
        Ok(())
    });

    let base_j = base.clone();
    let emit_j = emit.clone();
    let filter_j = flags.tag_filter.clone();
    let key_j = Rc::clone(&source_key);
    let source_handler = element!("source", move |el| {
        if tag_allowed(&filter_j, &el.tag_name()) {
            if let Some(val) = el.get_attribute(key_j.get()) {
                emit_j(DiscoveryKind::Static("source"), &val, &base_j);
            }
        }
        Ok(())
    });

    let scan_js = flags.scan_js;
    let scan_css = flags.scan_css;
    let base_k = base.clone();
    let emit_k = emit.clone();
    let script_has_src_b = Rc::clone(&script_has_src);
    let script_text_handler = text!("script", move |t| {
        if scan_js && !script_has_src_b.get() {
            let chunk = t.as_str();
            js::extract_js(chunk.as_bytes(), &base_k, |url| {
                emit_k(DiscoveryKind::Script, &url, &base_k);
            });
        }
        Ok(())
    });

    let base_l = base.clone();
    let emit_l = emit.clone();
    let style_text_handler = text!("style", move |t| {
        if scan_css {
            let chunk = t.as_str();
            css::extract_css(chunk.as_bytes(), &base_l, |url| {
                emit_l(DiscoveryKind::Static("style"), &url, &base_l);
            });
        }
        Ok(())
    });

    let brute = flags.brute;
    let base_m = base.clone();
    let emit_m = emit.clone();
    let comment_handler = doc_comments!(move |c| {
        if brute {
            extract_comment(c.text().as_str(), |url| {
                emit_m(DiscoveryKind::Anchor, &url, &base_m);
            });
        }
        Ok(())
    });

    let _ = rewrite_str(
        &input,
        RewriteStrSettings {
            element_content_handlers: vec![
                anchor_handler,
                static_src_handler,
                iframe_handler,
                script_handler,
                form_handler,
                object_handler,
                video_handler,
                audio_handler,
                picture_handler,
                source_handler,
                script_text_handler,
                style_text_handler,
            ],
            document_content_handlers: vec![comment_handler],
            ..RewriteStrSettings::default()
        },
    );
}

/// Scan one HTML comment body for absolute `http(s)://` URLs (brute mode only).
fn extract_comment(text: &str, mut emit: impl FnMut(String)) {
    for token in text.split_whitespace() {
        let lower = token.to_lowercase();
        let pos = lower
            .find("http://")
            .or_else(|| lower.find("https://"));

        let Some(pos) = pos else { continue };

        let mut candidate = &token[pos..];
        if let Some(end) = candidate.find(['<', '(', '\'', '>', '"']) {
            candidate = &candidate[..end];
        }

        let candidate = candidate.trim();
        if candidate.is_empty() {
            continue;
        }

        if let Ok(u) = Url::parse(candidate) {
            if u.host_str().is_some() {
                emit(candidate.to_string());
            }
        }
    }
}

fn leak_tag(tag: &str) -> &'static str {
    match tag.to_lowercase().as_str() {
        "img" => "img",
        "image" => "image",
        "track" => "track",
        _ => "static",
    }
}
