//! Markdown to terminal lines, via comrak.

use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options, parse_document};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::types::{InlineSpan, InlineStyle, LineType, RenderedLine};

const CODE_RIGHT_PADDING: usize = 3;
const HARD_BREAK: &str = "\n";

/// Enable the GitHub-flavored extensions shared by the preview and export.
pub fn enable_extensions(options: &mut Options) {
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
}

/// Render markdown `source` into lines no wider than `width` where possible.
///
/// Code blocks and tables are framed; words longer than `width` overflow
/// rather than being split.
pub fn render_markdown(source: &str, width: u16) -> Vec<RenderedLine> {
    let arena = Arena::new();
    let mut options = Options::default();
    enable_extensions(&mut options);
    let root = parse_document(&arena, source, &options);

    let mut renderer = Renderer {
        lines: Vec::new(),
        wrap_width: usize::from(width.max(1)),
    };
    renderer.block(root, 0);
    renderer.finish()
}

struct Renderer {
    lines: Vec<RenderedLine>,
    wrap_width: usize,
}

impl Renderer {
    fn finish(mut self) -> Vec<RenderedLine> {
        while self
            .lines
            .last()
            .is_some_and(|line| *line.line_type() == LineType::Empty)
        {
            self.lines.pop();
        }
        self.lines
    }

    fn blank(&mut self) {
        self.lines.push(RenderedLine::empty());
    }

    /// Ensure the previous block is separated by one blank row.
    fn separate(&mut self) {
        if self
            .lines
            .last()
            .is_some_and(|line| *line.line_type() != LineType::Empty)
        {
            self.blank();
        }
    }

    fn push_wrapped(&mut self, spans: &[InlineSpan], line_type: LineType, first: &str, next: &str) {
        for line in wrap_spans(spans, self.wrap_width, first, next) {
            self.lines.push(RenderedLine::from_spans(line_type, line));
        }
    }

    fn children<'a>(&mut self, node: &'a AstNode<'a>, depth: usize) {
        for child in node.children() {
            self.block(child, depth);
        }
    }

    fn block<'a>(&mut self, node: &'a AstNode<'a>, depth: usize) {
        match &node.data.borrow().value {
            NodeValue::Document => self.children(node, depth),
            NodeValue::Heading(heading) => {
                self.separate();
                let spans = collect_inline_spans(node);
                self.push_wrapped(&spans, LineType::Heading(heading.level), "", "");
                self.blank();
            }
            NodeValue::Paragraph => {
                if let Some(images) = paragraph_images(node) {
                    for (alt, src) in images {
                        self.lines
                            .push(RenderedLine::new(image_label(&alt, &src), LineType::Image));
                    }
                } else {
                    let spans = collect_inline_spans(node);
                    self.push_wrapped(&spans, LineType::Paragraph, "", "");
                }
                self.blank();
            }
            NodeValue::CodeBlock(code) => {
                let language = code.info.split_whitespace().next().unwrap_or("code");
                self.code_block(language, &code.literal);
                self.blank();
            }
            NodeValue::List(list) => {
                self.list(node, list.list_type, list.start, list.delimiter, depth + 1);
                if depth == 0 {
                    self.blank();
                }
            }
            NodeValue::Item(_) => self.list_item(node, depth.max(1), "• "),
            NodeValue::TaskItem(symbol) => {
                self.list_item(node, depth.max(1), task_marker(symbol.is_some()));
            }
            NodeValue::BlockQuote => {
                self.block_quote(node, 1);
                self.blank();
            }
            NodeValue::ThematicBreak => {
                self.lines.push(RenderedLine::new(
                    "─".repeat(self.wrap_width),
                    LineType::HorizontalRule,
                ));
                self.blank();
            }
            NodeValue::Table(_) => {
                for line in table_lines(node, self.wrap_width) {
                    self.lines.push(RenderedLine::new(line, LineType::Table));
                }
                self.blank();
            }
            NodeValue::FootnoteDefinition(def) => {
                let label = format!("[^{}]: ", def.name);
                let continuation = " ".repeat(UnicodeWidthStr::width(label.as_str()));
                let spans = collect_inline_spans(node);
                self.push_wrapped(&spans, LineType::Paragraph, &label, &continuation);
                self.blank();
            }
            NodeValue::Image(image) => {
                let alt = extract_text(node);
                self.lines
                    .push(RenderedLine::new(image_label(&alt, &image.url), LineType::Image));
            }
            _ => self.children(node, depth),
        }
    }

    fn code_block(&mut self, language: &str, literal: &str) {
        let content_width = literal
            .lines()
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(0)
            .min(self.wrap_width.saturating_sub(CODE_RIGHT_PADDING + 4).max(1));
        let inner_width = content_width + 2 + CODE_RIGHT_PADDING;

        let label = truncate_text(&format!(" {language} "), inner_width);
        let rule = "─".repeat(inner_width.saturating_sub(UnicodeWidthStr::width(label.as_str())));
        self.lines
            .push(RenderedLine::new(format!("┌{label}{rule}┐"), LineType::CodeBlock));

        for raw in literal.lines() {
            let text = truncate_text(raw, content_width);
            let padding = content_width.saturating_sub(UnicodeWidthStr::width(text.as_str()))
                + CODE_RIGHT_PADDING;
            let spans = vec![
                InlineSpan::plain("│ "),
                InlineSpan::new(text, InlineStyle::code()),
                InlineSpan::plain(format!("{} │", " ".repeat(padding))),
            ];
            self.lines
                .push(RenderedLine::from_spans(LineType::CodeBlock, spans));
        }

        self.lines.push(RenderedLine::new(
            format!("└{}┘", "─".repeat(inner_width)),
            LineType::CodeBlock,
        ));
    }

    fn list<'a>(
        &mut self,
        node: &'a AstNode<'a>,
        list_type: ListType,
        start: usize,
        delimiter: ListDelimType,
        depth: usize,
    ) {
        let delimiter = match delimiter {
            ListDelimType::Paren => ')',
            ListDelimType::Period => '.',
        };
        let last_number = start + node.children().count().saturating_sub(1);
        let number_width = last_number.to_string().len();

        for (index, item) in node.children().enumerate() {
            let marker = match (task_state(item), list_type) {
                (Some(done), _) => task_marker(done).to_string(),
                (None, ListType::Bullet) => "• ".to_string(),
                (None, ListType::Ordered) => {
                    format!("{:>number_width$}{delimiter} ", start + index)
                }
            };
            self.list_item(item, depth, &marker);
        }
    }

    fn list_item<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, marker: &str) {
        let indent = "  ".repeat(depth.saturating_sub(1));
        let first = format!("{indent}{marker}");
        let next = format!("{indent}{}", " ".repeat(UnicodeWidthStr::width(marker)));
        let mut paragraphs = 0usize;

        for child in block_children(node) {
            let is_paragraph = matches!(child.data.borrow().value, NodeValue::Paragraph);
            if is_paragraph {
                if paragraphs > 0 {
                    self.lines
                        .push(RenderedLine::new(String::new(), LineType::ListItem(depth)));
                }
                let prefix = if paragraphs == 0 { &first } else { &next };
                let spans = collect_inline_spans(child);
                self.push_wrapped(&spans, LineType::ListItem(depth), prefix, &next);
                paragraphs += 1;
            } else {
                self.block(child, depth);
            }
        }

        if paragraphs == 0 {
            self.push_wrapped(&[], LineType::ListItem(depth), &first, &next);
        }
    }

    fn block_quote<'a>(&mut self, node: &'a AstNode<'a>, quote_depth: usize) {
        let prefix = format!("  {}", "│ ".repeat(quote_depth));
        for child in node.children() {
            match &child.data.borrow().value {
                NodeValue::Paragraph => {
                    let spans = collect_inline_spans(child);
                    self.push_wrapped(&spans, LineType::BlockQuote, &prefix, &prefix);
                }
                NodeValue::BlockQuote => self.block_quote(child, quote_depth + 1),
                _ => {
                    for raw in extract_text(child).lines() {
                        let spans = [InlineSpan::plain(raw)];
                        self.push_wrapped(&spans, LineType::BlockQuote, &prefix, &prefix);
                    }
                }
            }
        }
    }
}

/// Checked state of a task list item, whether the item itself or its
/// first child carries the task marker.
fn task_state<'a>(item: &'a AstNode<'a>) -> Option<bool> {
    std::iter::once(item)
        .chain(item.first_child())
        .find_map(|node| match &node.data.borrow().value {
            NodeValue::TaskItem(symbol) => Some(symbol.is_some()),
            _ => None,
        })
}

/// Children of a list item, looking through a nested task marker node.
fn block_children<'a>(item: &'a AstNode<'a>) -> Vec<&'a AstNode<'a>> {
    let mut out = Vec::new();
    for child in item.children() {
        if matches!(child.data.borrow().value, NodeValue::TaskItem(_)) {
            out.extend(child.children());
        } else {
            out.push(child);
        }
    }
    out
}

const fn task_marker(done: bool) -> &'static str {
    if done { "✓ " } else { "□ " }
}

fn image_label(alt: &str, src: &str) -> String {
    format!("[Image: {}]", if alt.is_empty() { src } else { alt })
}

/// `(alt, src)` pairs when a paragraph holds nothing but images.
fn paragraph_images<'a>(node: &'a AstNode<'a>) -> Option<Vec<(String, String)>> {
    let mut images = Vec::new();
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Image(image) => images.push((extract_text(child), image.url.clone())),
            NodeValue::Text(text) if text.trim().is_empty() => {}
            NodeValue::SoftBreak | NodeValue::LineBreak => {}
            _ => return None,
        }
    }
    (!images.is_empty()).then_some(images)
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_into(node, &mut text);
    text
}

fn extract_text_into<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(code) => {
            text.push('`');
            text.push_str(&code.literal);
            text.push('`');
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push('\n'),
        _ => {
            for child in node.children() {
                extract_text_into(child, text);
            }
        }
    }
}

fn collect_inline_spans<'a>(node: &'a AstNode<'a>) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    for child in node.children() {
        collect_inline_into(child, InlineStyle::default(), &mut spans);
    }
    spans
}

fn collect_inline_into<'a>(node: &'a AstNode<'a>, style: InlineStyle, spans: &mut Vec<InlineSpan>) {
    let nested = |spans: &mut Vec<InlineSpan>, next: InlineStyle| {
        for child in node.children() {
            collect_inline_into(child, next, spans);
        }
    };
    match &node.data.borrow().value {
        // Nested blocks inside list items are rendered separately.
        NodeValue::List(_) | NodeValue::Item(_) | NodeValue::TaskItem(_) => {}
        NodeValue::Text(t) => spans.push(InlineSpan::new(t.clone(), style)),
        NodeValue::Code(code) => spans.push(InlineSpan::new(code.literal.clone(), InlineStyle {
            link: style.link,
            ..InlineStyle::code()
        })),
        NodeValue::Emph => nested(spans, InlineStyle {
            emphasis: true,
            ..style
        }),
        NodeValue::Strong => nested(spans, InlineStyle {
            strong: true,
            ..style
        }),
        NodeValue::Strikethrough => nested(spans, InlineStyle {
            strikethrough: true,
            ..style
        }),
        NodeValue::Link(_) => nested(spans, InlineStyle { link: true, ..style }),
        NodeValue::Image(image) => {
            let label = image_label(&extract_text(node), &image.url);
            spans.push(InlineSpan::new(label, InlineStyle { link: true, ..style }));
        }
        NodeValue::FootnoteReference(reference) => {
            spans.push(InlineSpan::new(format!("[^{}]", reference.name), style));
        }
        NodeValue::SoftBreak => spans.push(InlineSpan::new(" ", style)),
        NodeValue::LineBreak => spans.push(InlineSpan::plain(HARD_BREAK)),
        _ => nested(spans, style),
    }
}

/// A wrapped line being assembled. `fixed` spans (the prefix) are never trimmed.
struct LineBuilder {
    spans: Vec<InlineSpan>,
    width: usize,
    fixed: usize,
    has_word: bool,
}

impl LineBuilder {
    fn start(prefix: &str) -> Self {
        let mut spans = Vec::new();
        if !prefix.is_empty() {
            spans.push(InlineSpan::plain(prefix));
        }
        Self {
            fixed: spans.len(),
            width: UnicodeWidthStr::width(prefix),
            spans,
            has_word: false,
        }
    }

    fn finish(mut self) -> Vec<InlineSpan> {
        while self.spans.len() > self.fixed
            && self
                .spans
                .last()
                .is_some_and(|span| span.text().chars().all(char::is_whitespace))
        {
            self.spans.pop();
        }
        self.spans
    }
}

fn wrap_spans(
    spans: &[InlineSpan],
    width: usize,
    prefix_first: &str,
    prefix_next: &str,
) -> Vec<Vec<InlineSpan>> {
    let mut lines = Vec::new();
    let mut line = LineBuilder::start(prefix_first);

    for token in spans.iter().flat_map(split_tokens) {
        if token.text() == HARD_BREAK {
            lines.push(line.finish());
            line = LineBuilder::start(prefix_next);
            continue;
        }

        let token_width = UnicodeWidthStr::width(token.text());
        let is_space = token.text().chars().all(char::is_whitespace);

        if line.has_word && line.width + token_width > width {
            lines.push(line.finish());
            line = LineBuilder::start(prefix_next);
        }
        if is_space && !line.has_word {
            continue;
        }

        line.width += token_width;
        line.has_word |= !is_space;
        line.spans.push(token);
    }

    lines.push(line.finish());
    lines
}

/// Split a span into alternating runs of whitespace and non-whitespace.
fn split_tokens(span: &InlineSpan) -> Vec<InlineSpan> {
    if span.text() == HARD_BREAK {
        return vec![span.clone()];
    }
    let mut tokens = Vec::new();
    let mut run = String::new();
    let mut run_is_space = None;

    for ch in span.text().chars() {
        let is_space = ch.is_whitespace();
        if run_is_space.is_some_and(|s| s != is_space) {
            tokens.push(InlineSpan::new(std::mem::take(&mut run), span.style()));
        }
        run.push(ch);
        run_is_space = Some(is_space);
    }
    if !run.is_empty() {
        tokens.push(InlineSpan::new(run, span.style()));
    }
    tokens
}

fn truncate_text(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut width = 0usize;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out
}

fn table_lines<'a>(node: &'a AstNode<'a>, max_width: usize) -> Vec<String> {
    let alignments = match &node.data.borrow().value {
        NodeValue::Table(table) => table.alignments.clone(),
        _ => Vec::new(),
    };

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut has_header = false;
    for row in node.children() {
        match row.data.borrow().value {
            NodeValue::TableRow(header) => has_header |= header && rows.is_empty(),
            _ => continue,
        }
        let cells = row
            .children()
            .filter(|cell| matches!(cell.data.borrow().value, NodeValue::TableCell))
            .map(|cell| extract_text(cell).split_whitespace().collect::<Vec<_>>().join(" "))
            .collect();
        rows.push(cells);
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return Vec::new();
    }

    let mut widths = vec![1usize; columns];
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(cell.as_str()));
        }
    }
    // Row width is 1 + sum(width + 3); shave the widest column until it fits.
    while 1 + widths.iter().sum::<usize>() + 3 * columns > max_width.max(4) {
        let Some((widest, _)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
            break;
        };
        if widths[widest] <= 1 {
            break;
        }
        widths[widest] -= 1;
    }

    let mut lines = vec![table_border(&widths, '┌', '┬', '┐')];
    for (idx, row) in rows.iter().enumerate() {
        lines.push(table_row(row, &widths, &alignments));
        if has_header && idx == 0 {
            lines.push(table_border(&widths, '├', '┼', '┤'));
        }
    }
    lines.push(table_border(&widths, '└', '┴', '┘'));
    lines
}

fn table_border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}", segments.join(&middle.to_string()))
}

fn table_row(cells: &[String], widths: &[usize], alignments: &[TableAlignment]) -> String {
    let mut out = String::from("│");
    for (idx, width) in widths.iter().enumerate() {
        let text = truncate_text(cells.get(idx).map_or("", String::as_str), *width);
        let padding = width.saturating_sub(UnicodeWidthStr::width(text.as_str()));
        let (left, right) = match alignments.get(idx).copied().unwrap_or(TableAlignment::None) {
            TableAlignment::Right => (padding, 0),
            TableAlignment::Center => (padding / 2, padding - padding / 2),
            TableAlignment::Left | TableAlignment::None => (0, padding),
        };
        out.push(' ');
        out.push_str(&" ".repeat(left));
        out.push_str(&text);
        out.push_str(&" ".repeat(right));
        out.push_str(" │");
    }
    out
}
