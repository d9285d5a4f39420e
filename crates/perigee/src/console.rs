//! Append-only console line buffers.

/// Lines received from one output source, newest last.
#[derive(Debug, Clone)]
pub struct Console {
    name: String,
    title: String,
    lines: Vec<String>,
    visible: bool,
    /// Lines scrolled up from the bottom; new output snaps back to 0.
    scroll: usize,
}

impl Console {
    pub fn new(name: &str, title: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            lines: Vec::new(),
            visible: false,
            scroll: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Append text; embedded newlines become separate lines.
    pub fn push(&mut self, text: &str) {
        self.scroll = 0;
        if text.is_empty() {
            self.lines.push(String::new());
            return;
        }
        self.lines.extend(text.lines().map(str::to_string));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The `height` lines in view, honouring the scroll offset.
    pub fn view(&self, height: usize) -> &[String] {
        let end = self.lines.len().saturating_sub(self.scroll);
        let start = end.saturating_sub(height);
        &self.lines[start..end]
    }

    pub fn scroll_up(&mut self, amount: usize) {
        let max = self.lines.len().saturating_sub(1);
        self.scroll = (self.scroll + amount).min(max);
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll = self.scroll.saturating_sub(amount);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = 0;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn reset(&mut self) {
        self.lines.clear();
        self.scroll = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::Console;

    #[test]
    fn push_splits_multi_line_text() {
        let mut console = Console::new("tidal", "Tidal");
        console.push("d1 $ s \"bd\"");
        console.push("d1\n  # speed 2");
        assert_eq!(console.lines(), ["d1 $ s \"bd\"", "d1", "  # speed 2"]);
    }

    #[test]
    fn view_keeps_newest_lines() {
        let mut console = Console::new("sclang", "SCLang");
        for idx in 0..20 {
            console.push(&format!("line {idx}"));
        }
        assert_eq!(console.view(2), ["line 18", "line 19"]);
        assert_eq!(console.view(100).len(), 20);
    }

    #[test]
    fn scrolling_moves_view_until_new_output_arrives() {
        let mut console = Console::new("tidal", "Tidal");
        for idx in 0..5 {
            console.push(&idx.to_string());
        }
        console.scroll_up(2);
        assert_eq!(console.view(2), ["1", "2"]);
        console.scroll_up(100);
        assert_eq!(console.view(2), ["0"]);
        console.scroll_down(1);
        assert_eq!(console.view(2), ["0", "1"]);

        console.push("5");
        assert_eq!(console.view(2), ["4", "5"]);
    }

    #[test]
    fn reset_clears_lines_only() {
        let mut console = Console::new("osc", "OSC");
        console.set_visible(true);
        console.push("/play ,s bd");
        console.reset();
        assert!(console.is_empty());
        assert!(console.visible());
    }
}
