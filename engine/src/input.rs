//! Credential input collectors.
//!
//! Collectors only ever store ASCII digits. Anything else is dropped at the
//! keystroke, so the value handed to the validator is already digit-only
//! (possibly short).

use keygate_types::{CredentialKind, PIN_LENGTH};

/// A form field that produces a candidate credential.
pub trait CredentialInput: Default {
    const KIND: CredentialKind;
    /// Label of the enabled submit control.
    const SUBMIT_LABEL: &'static str;

    /// The candidate value as it will be validated.
    fn value(&self) -> String;

    fn clear(&mut self);
}

/// Keep only ASCII digits. Idempotent.
#[must_use]
pub fn strip_non_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Four single-digit slots with a focus cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinInput {
    slots: [Option<char>; PIN_LENGTH],
    focus: usize,
}

impl PinInput {
    /// Write `raw` into slot `index`.
    ///
    /// Non-digits and out-of-range indices are ignored (returns `false`, focus
    /// unchanged). A digit advances focus to the next slot unless it was the last.
    pub fn set_digit(&mut self, index: usize, raw: char) -> bool {
        if index >= PIN_LENGTH || !raw.is_ascii_digit() {
            return false;
        }
        self.slots[index] = Some(raw);
        if index < PIN_LENGTH - 1 {
            self.focus = index + 1;
        } else {
            self.focus = index;
        }
        true
    }

    /// Write into the focused slot.
    pub fn type_char(&mut self, raw: char) -> bool {
        self.set_digit(self.focus, raw)
    }

    /// Clear the focused slot, or step back and clear the previous one if the
    /// focused slot is already empty.
    pub fn backspace(&mut self) {
        if self.slots[self.focus].is_some() {
            self.slots[self.focus] = None;
        } else if self.focus > 0 {
            self.focus -= 1;
            self.slots[self.focus] = None;
        }
    }

    pub fn focus_left(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    pub fn focus_right(&mut self) {
        self.focus = (self.focus + 1).min(PIN_LENGTH - 1);
    }

    #[must_use]
    pub fn focus(&self) -> usize {
        self.focus
    }

    #[must_use]
    pub fn slots(&self) -> &[Option<char>; PIN_LENGTH] {
        &self.slots
    }

    /// Concatenation of the slots; empty slots contribute nothing.
    #[must_use]
    pub fn joined(&self) -> String {
        self.slots.iter().flatten().collect()
    }
}

impl CredentialInput for PinInput {
    const KIND: CredentialKind = CredentialKind::Pin;
    const SUBMIT_LABEL: &'static str = "Next";

    fn value(&self) -> String {
        self.joined()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Free-length digit field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpInput {
    value: String,
}

impl OtpInput {
    /// Replace the stored value with the digits of `raw`.
    pub fn set_value(&mut self, raw: &str) {
        self.value = strip_non_digits(raw);
    }

    /// Append one character if it is a digit.
    pub fn push(&mut self, raw: char) -> bool {
        if raw.is_ascii_digit() {
            self.value.push(raw);
            true
        } else {
            false
        }
    }

    /// Append the digits of pasted text.
    pub fn paste(&mut self, raw: &str) {
        self.value.push_str(&strip_non_digits(raw));
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl CredentialInput for OtpInput {
    const KIND: CredentialKind = CredentialKind::Otp;
    const SUBMIT_LABEL: &'static str = "Sign In";

    fn value(&self) -> String {
        self.value.clone()
    }

    fn clear(&mut self) {
        self.value.clear();
    }
}
