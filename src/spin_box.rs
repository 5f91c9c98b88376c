use iced::widget::{button, row, text, text_input};
use iced::Element;

/// Frame-position field with step buttons.
///
/// Typed text only takes effect on submit; anything that is not a number
/// reverts to the current value. While the user is typing, the text is left
/// alone by [`sync`](SpinBox::sync) so playback does not overwrite it.
#[derive(Debug, Clone, Default)]
pub struct SpinBox {
    value: u64,
    max: u64,
    text: String,
    editing: bool,
}

impl SpinBox {
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Follows the player's position. Uncommitted text survives unless the
    /// range changed, which means another file was loaded or dropped.
    pub fn sync(&mut self, value: u64, max: u64) {
        if max != self.max {
            self.editing = false;
        }
        self.max = max;
        self.value = value.min(max);
        if !self.editing {
            self.text = self.value.to_string();
        }
    }

    pub fn input(&mut self, text: String) {
        if text.chars().all(|c| c.is_ascii_digit()) {
            self.text = text;
            self.editing = true;
        }
    }

    /// Commits the typed text and returns the resulting value.
    pub fn submit(&mut self) -> u64 {
        if let Ok(value) = self.text.trim().parse::<u64>() {
            self.value = value.min(self.max);
        }
        self.editing = false;
        self.text = self.value.to_string();
        self.value
    }

    pub fn step(&mut self, delta: i64) -> u64 {
        self.editing = false;
        self.value = if delta < 0 {
            self.value.saturating_sub(delta.unsigned_abs())
        } else {
            self.value.saturating_add(delta as u64).min(self.max)
        };
        self.text = self.value.to_string();
        self.value
    }

    pub fn view<'a, Message: Clone + 'a>(
        &'a self,
        on_input: impl Fn(String) -> Message + 'a,
        on_submit: Message,
        on_step: impl Fn(i64) -> Message,
    ) -> Element<'a, Message> {
        row![
            button(text("-")).on_press(on_step(-1)),
            text_input("0", &self.text)
                .on_input(on_input)
                .on_submit(on_submit)
                .width(70.0),
            button(text("+")).on_press(on_step(1)),
        ]
        .spacing(2)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_clamps_to_max() {
        let mut spin = SpinBox::default();
        spin.sync(10, 100);
        spin.input("250".into());
        assert_eq!(spin.submit(), 100);
        assert_eq!(spin.text(), "100");
    }

    #[test]
    fn invalid_text_reverts() {
        let mut spin = SpinBox::default();
        spin.sync(42, 100);
        spin.input("4x".into());
        assert_eq!(spin.text(), "42");
        spin.input(String::new());
        assert_eq!(spin.submit(), 42);
        assert_eq!(spin.text(), "42");
    }

    #[test]
    fn steps_stay_in_range() {
        let mut spin = SpinBox::default();
        spin.sync(0, 3);
        assert_eq!(spin.step(-1), 0);
        assert_eq!(spin.step(1), 1);
        assert_eq!(spin.step(5), 3);
        assert_eq!(spin.max(), 3);
    }

    #[test]
    fn sync_keeps_typing() {
        let mut spin = SpinBox::default();
        spin.sync(5, 10);
        spin.input("7".into());
        spin.sync(6, 10);
        assert_eq!(spin.value(), 6);
        assert_eq!(spin.text(), "7");
        assert!(spin.is_editing());

        assert_eq!(spin.submit(), 7);
        assert!(!spin.is_editing());
        spin.sync(8, 10);
        assert_eq!(spin.text(), "8");
    }

    #[test]
    fn new_range_discards_typing() {
        let mut spin = SpinBox::default();
        spin.sync(5, 10);
        spin.input("7".into());
        spin.sync(0, 0);
        assert_eq!(spin.text(), "0");
        assert!(!spin.is_editing());
    }

    #[test]
    fn step_ends_editing() {
        let mut spin = SpinBox::default();
        spin.sync(5, 10);
        spin.input("9".into());
        assert_eq!(spin.step(1), 6);
        assert_eq!(spin.text(), "6");
        spin.sync(7, 10);
        assert_eq!(spin.text(), "7");
    }
}
