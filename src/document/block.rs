//! Block-level element classification

/// Elements that are never split and never entered for text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomicKind {
    Image,
    Rule,
    Media,
    /// script, style and other non-rendered carriers
    Script,
    FormControl,
}

/// The kind of element, derived from its tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockKind {
    /// Regular paragraph
    #[default]
    Paragraph,
    /// Heading with level (1-6)
    Heading { level: u8 },
    /// List item
    ListItem,
    /// Ordered or unordered list
    List { ordered: bool },
    /// Preformatted text
    Preformatted,
    /// Generic block container (div, section, blockquote, table parts...)
    Container,
    /// Forced line break inside inline content
    LineBreak,
    /// Inline formatting (b, i, span, a...)
    Inline,
    /// Unsplittable element
    Atomic(AtomicKind),
}

impl BlockKind {
    /// Classify a lowercase tag name
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "p" => BlockKind::Paragraph,
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => BlockKind::Heading {
                level: tag[1..].parse().unwrap_or(6),
            },
            "li" | "dt" | "dd" => BlockKind::ListItem,
            "ul" | "menu" | "dl" => BlockKind::List { ordered: false },
            "ol" => BlockKind::List { ordered: true },
            "pre" => BlockKind::Preformatted,
            "div" | "section" | "article" | "aside" | "header" | "footer" | "main" | "nav"
            | "blockquote" | "figure" | "figcaption" | "table" | "thead" | "tbody" | "tfoot"
            | "tr" | "td" | "th" | "caption" | "address" | "details" | "summary" | "body" => {
                BlockKind::Container
            }
            "br" => BlockKind::LineBreak,
            "img" | "picture" => BlockKind::Atomic(AtomicKind::Image),
            "hr" => BlockKind::Atomic(AtomicKind::Rule),
            "video" | "audio" | "iframe" | "embed" | "object" | "canvas" | "svg" | "math" => {
                BlockKind::Atomic(AtomicKind::Media)
            }
            "script" | "style" | "template" | "noscript" | "link" | "meta" | "head" | "title" => {
                BlockKind::Atomic(AtomicKind::Script)
            }
            "input" | "select" | "textarea" | "button" | "progress" | "meter" => {
                BlockKind::Atomic(AtomicKind::FormControl)
            }
            _ => BlockKind::Inline,
        }
    }

    /// Get the line height multiplier for this block kind
    pub fn line_height_multiplier(&self) -> f32 {
        match self {
            BlockKind::Heading { level } => match level {
                1 => 1.5,
                2 => 1.4,
                3 => 1.3,
                _ => 1.2,
            },
            _ => 1.0,
        }
    }

    /// Spacing above this block in pixels
    pub fn margin_top(&self) -> f32 {
        match self {
            BlockKind::Heading { level } if *level <= 2 => 12.0,
            BlockKind::Heading { .. } => 8.0,
            BlockKind::List { .. } => 8.0,
            _ => 0.0,
        }
    }

    /// Spacing below this block in pixels
    pub fn margin_bottom(&self) -> f32 {
        match self {
            BlockKind::Paragraph | BlockKind::Preformatted => 16.0,
            BlockKind::Heading { .. } => 8.0,
            BlockKind::ListItem => 4.0,
            BlockKind::List { .. } => 8.0,
            _ => 0.0,
        }
    }

    /// Horizontal indentation applied to content
    pub fn indent(&self) -> f32 {
        match self {
            BlockKind::List { .. } => 24.0,
            _ => 0.0,
        }
    }

    /// Height used for atomic elements without an explicit height
    pub fn default_atomic_height(&self) -> f32 {
        match self {
            BlockKind::Atomic(AtomicKind::Image) => 150.0,
            BlockKind::Atomic(AtomicKind::Rule) => 2.0,
            BlockKind::Atomic(AtomicKind::Media) => 150.0,
            BlockKind::Atomic(AtomicKind::FormControl) => 24.0,
            _ => 0.0,
        }
    }

    /// Starts its own line group in flow layout
    pub fn is_block_level(&self) -> bool {
        !matches!(
            self,
            BlockKind::Inline | BlockKind::LineBreak | BlockKind::Atomic(_)
        )
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self, BlockKind::Atomic(_))
    }

    /// Check if this is a heading
    pub fn is_heading(&self) -> bool {
        matches!(self, BlockKind::Heading { .. })
    }

    /// Check if this is a list item
    pub fn is_list_item(&self) -> bool {
        matches!(self, BlockKind::ListItem)
    }
}
