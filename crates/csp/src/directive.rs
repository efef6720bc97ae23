//! The closed catalog of CSP directives.

use std::cmp::Ordering;
use std::fmt;

/// A CSP directive tag.
///
/// The catalog is closed: unknown tags are unrepresentable, so typos
/// surface at compile time for callers and as parse failures for header
/// input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Directive {
    /// `<base>`
    BaseUri,
    /// Web workers, `<frame>` and `<iframe>`
    ChildSrc,
    /// Script interfaces: fetch, XHR, WebSocket, sendBeacon, ping
    ConnectSrc,
    /// Fallback for the other fetch directives
    DefaultSrc,
    /// `<fencedframe>`
    FencedFrameSrc,
    /// Fonts
    FontSrc,
    /// Form submission targets
    FormAction,
    /// Which ancestors may embed this document
    FrameAncestors,
    /// `<frame>` and `<iframe>`
    FrameSrc,
    /// Images and favicons
    ImgSrc,
    /// Manifest files
    ManifestSrc,
    /// `<audio>` and `<video>`
    MediaSrc,
    /// Navigation targets: links, form submissions, `window.open`
    NavigateTo,
    /// `<object>` and `<embed>`
    ObjectSrc,
    /// Prefetched or prerendered resources (deprecated)
    PrefetchSrc,
    /// Legacy reporting endpoint, superseded by report-to
    ReportUri,
    /// Sandbox for the requested resource
    Sandbox,
    /// `<script>` elements, inline handlers, and XSLT stylesheets
    ScriptSrc,
    /// Inline script event handlers only
    ScriptSrcAttr,
    /// `<script>` elements
    ScriptSrcElem,
    /// Stylesheets
    StyleSrc,
    /// Inline style attributes
    StyleSrcAttr,
    /// `<link rel="stylesheet">` and `<style>` elements
    StyleSrcElem,
    /// Worker, SharedWorker, and ServiceWorker scripts
    WorkerSrc,
}

impl Directive {
    /// Every directive in the catalog.
    pub const ALL: [Directive; 24] = [
        Directive::BaseUri,
        Directive::ChildSrc,
        Directive::ConnectSrc,
        Directive::DefaultSrc,
        Directive::FencedFrameSrc,
        Directive::FontSrc,
        Directive::FormAction,
        Directive::FrameAncestors,
        Directive::FrameSrc,
        Directive::ImgSrc,
        Directive::ManifestSrc,
        Directive::MediaSrc,
        Directive::NavigateTo,
        Directive::ObjectSrc,
        Directive::PrefetchSrc,
        Directive::ReportUri,
        Directive::Sandbox,
        Directive::ScriptSrc,
        Directive::ScriptSrcAttr,
        Directive::ScriptSrcElem,
        Directive::StyleSrc,
        Directive::StyleSrcAttr,
        Directive::StyleSrcElem,
        Directive::WorkerSrc,
    ];

    /// Parse a directive tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "base-uri" => Some(Directive::BaseUri),
            "child-src" => Some(Directive::ChildSrc),
            "connect-src" => Some(Directive::ConnectSrc),
            "default-src" => Some(Directive::DefaultSrc),
            "fenced-frame-src" => Some(Directive::FencedFrameSrc),
            "font-src" => Some(Directive::FontSrc),
            "form-action" => Some(Directive::FormAction),
            "frame-ancestors" => Some(Directive::FrameAncestors),
            "frame-src" => Some(Directive::FrameSrc),
            "img-src" => Some(Directive::ImgSrc),
            "manifest-src" => Some(Directive::ManifestSrc),
            "media-src" => Some(Directive::MediaSrc),
            "navigate-to" => Some(Directive::NavigateTo),
            "object-src" => Some(Directive::ObjectSrc),
            "prefetch-src" => Some(Directive::PrefetchSrc),
            "report-uri" => Some(Directive::ReportUri),
            "sandbox" => Some(Directive::Sandbox),
            "script-src" => Some(Directive::ScriptSrc),
            "script-src-attr" => Some(Directive::ScriptSrcAttr),
            "script-src-elem" => Some(Directive::ScriptSrcElem),
            "style-src" => Some(Directive::StyleSrc),
            "style-src-attr" => Some(Directive::StyleSrcAttr),
            "style-src-elem" => Some(Directive::StyleSrcElem),
            "worker-src" => Some(Directive::WorkerSrc),
            _ => None,
        }
    }

    /// The serialized tag for this directive.
    pub fn as_str(self) -> &'static str {
        match self {
            Directive::BaseUri => "base-uri",
            Directive::ChildSrc => "child-src",
            Directive::ConnectSrc => "connect-src",
            Directive::DefaultSrc => "default-src",
            Directive::FencedFrameSrc => "fenced-frame-src",
            Directive::FontSrc => "font-src",
            Directive::FormAction => "form-action",
            Directive::FrameAncestors => "frame-ancestors",
            Directive::FrameSrc => "frame-src",
            Directive::ImgSrc => "img-src",
            Directive::ManifestSrc => "manifest-src",
            Directive::MediaSrc => "media-src",
            Directive::NavigateTo => "navigate-to",
            Directive::ObjectSrc => "object-src",
            Directive::PrefetchSrc => "prefetch-src",
            Directive::ReportUri => "report-uri",
            Directive::Sandbox => "sandbox",
            Directive::ScriptSrc => "script-src",
            Directive::ScriptSrcAttr => "script-src-attr",
            Directive::ScriptSrcElem => "script-src-elem",
            Directive::StyleSrc => "style-src",
            Directive::StyleSrcAttr => "style-src-attr",
            Directive::StyleSrcElem => "style-src-elem",
            Directive::WorkerSrc => "worker-src",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Directives order by their serialized tag, so sorted collections come out
// alphabetical regardless of declaration order.
impl Ord for Directive {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Directive {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
