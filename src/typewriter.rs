use crate::error::EffectError;
use crate::scheduler::{Scheduler, TimerLoop};
use std::cell::RefCell;
use std::rc::Rc;

pub const NEXT_WORD_PAUSE_MS: u32 = 500;

/// Typing/deleting state over a fixed, non-empty word list.
#[derive(Clone, Debug, PartialEq)]
pub struct TypewriterState {
    words: Vec<String>,
    word_index: usize,
    text: String,
    deleting: bool,
    wait_ms: u32,
    type_delay_ms: u32,
}

impl TypewriterState {
    pub fn new(words: Vec<String>, wait_ms: u32, type_delay_ms: u32) -> Result<Self, EffectError> {
        if words.is_empty() {
            return Err(EffectError::EmptyWordList);
        }

        Ok(Self {
            words,
            word_index: 0,
            text: String::new(),
            deleting: false,
            wait_ms,
            type_delay_ms,
        })
    }

    /// Types or deletes one character and returns the delay before the next
    /// tick.
    pub fn tick(&mut self) -> u32 {
        let full = &self.words[self.word_index];
        let shown = self.text.chars().count();
        let next_len = if self.deleting {
            shown.saturating_sub(1)
        } else {
            shown + 1
        };
        self.text = full.chars().take(next_len).collect();

        if !self.deleting && self.text == *full {
            self.deleting = true;
            self.wait_ms
        } else if self.deleting && self.text.is_empty() {
            self.deleting = false;
            self.word_index = (self.word_index + 1) % self.words.len();
            NEXT_WORD_PAUSE_MS
        } else if self.deleting {
            self.type_delay_ms / 2
        } else {
            self.type_delay_ms
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn word_index(&self) -> usize {
        self.word_index
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }
}

/// Drives a [`TypewriterState`] on a scheduler, reporting every change of
/// the visible text.
pub struct Typewriter {
    timer: TimerLoop,
    state: Rc<RefCell<TypewriterState>>,
}

impl Typewriter {
    pub fn start(
        scheduler: Rc<dyn Scheduler>,
        state: TypewriterState,
        mut on_text: impl FnMut(&str) + 'static,
    ) -> Self {
        let state = Rc::new(RefCell::new(state));

        let first_delay = {
            let mut current = state.borrow_mut();
            let delay = current.tick();
            on_text(current.text());
            delay
        };

        let shared = Rc::clone(&state);
        let timer = TimerLoop::start(scheduler, first_delay, move || {
            let mut current = shared.borrow_mut();
            let delay = current.tick();
            on_text(current.text());
            Some(delay)
        });

        Self { timer, state }
    }

    pub fn text(&self) -> String {
        self.state.borrow().text().to_string()
    }

    pub fn stop(&self) {
        self.timer.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|word| word.to_string()).collect()
    }

    #[test]
    fn empty_word_list_is_rejected() {
        let result = TypewriterState::new(Vec::new(), 2_000, 200);

        assert_eq!(result, Err(EffectError::EmptyWordList));
    }

    #[test]
    fn one_cycle_types_the_word_then_empties() {
        let mut state =
            TypewriterState::new(words(&["Data Scientist", "Engineer"]), 2_000, 200)
                .expect("non-empty words");
        let word = "Data Scientist";
        let mut frames = Vec::new();

        loop {
            state.tick();
            frames.push(state.text().to_string());
            if state.word_index() == 1 {
                break;
            }
        }

        let peak = frames
            .iter()
            .position(|frame| frame == word)
            .expect("the full word is shown");
        assert_eq!(peak + 1, word.chars().count());
        for (index, frame) in frames[..=peak].iter().enumerate() {
            assert_eq!(frame.as_str(), &word[..=index]);
        }
        assert_eq!(frames.last().map(String::as_str), Some(""));
        assert_eq!(frames.len(), 2 * word.chars().count());
    }

    #[test]
    fn delays_follow_typing_wait_and_deleting_speed() {
        let mut state = TypewriterState::new(words(&["abc"]), 1_000, 200).expect("non-empty");

        let delays: Vec<u32> = (0..7).map(|_| state.tick()).collect();

        assert_eq!(delays, vec![200, 200, 1_000, 100, 100, NEXT_WORD_PAUSE_MS, 200]);
        assert_eq!(state.text(), "a");
        assert_eq!(state.word_index(), 0);
    }

    #[test]
    fn multibyte_words_are_typed_by_character() {
        let mut state = TypewriterState::new(words(&["héllo"]), 100, 20).expect("non-empty");

        state.tick();
        state.tick();
        assert_eq!(state.text(), "hé");
    }

    #[test]
    fn word_index_wraps_after_the_last_word() {
        let mut state = TypewriterState::new(words(&["a", "b"]), 10, 10).expect("non-empty");

        // "a" typed, "" deleted, "b" typed, "" deleted.
        for _ in 0..4 {
            state.tick();
        }
        assert_eq!(state.word_index(), 0);
        assert!(!state.is_deleting());
    }

    #[test]
    fn driver_publishes_text_on_the_scheduler_clock() {
        let manual = Rc::new(ManualScheduler::new());
        let shown = Rc::new(RefCell::new(Vec::new()));

        let log = shown.clone();
        let typewriter = Typewriter::start(
            manual.clone(),
            TypewriterState::new(words(&["hi"]), 1_000, 200).expect("non-empty"),
            move |text| log.borrow_mut().push(text.to_string()),
        );

        assert_eq!(*shown.borrow(), vec!["h"]);
        manual.advance(200.0);
        assert_eq!(typewriter.text(), "hi");
        manual.advance(999.0);
        assert_eq!(shown.borrow().len(), 2);
        manual.advance(1.0);
        assert_eq!(typewriter.text(), "h");

        typewriter.stop();
        manual.advance(10_000.0);
        assert_eq!(typewriter.text(), "h");
        assert!(!typewriter.is_running());
        assert_eq!(manual.pending_timers(), 0);
    }
}
