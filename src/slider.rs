use crate::error::EffectError;
use crate::scheduler::{Scheduler, TimerLoop};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Current slide over a fixed, non-empty slide count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlideDeck {
    index: usize,
    count: usize,
}

impl SlideDeck {
    pub fn new(count: usize) -> Result<Self, EffectError> {
        if count == 0 {
            return Err(EffectError::EmptySlider);
        }

        Ok(Self { index: 0, count })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn next(&mut self) -> usize {
        self.index = (self.index + 1) % self.count;
        self.index
    }

    pub fn prev(&mut self) -> usize {
        self.index = (self.index + self.count - 1) % self.count;
        self.index
    }

    /// Out-of-range indices are rejected and leave the deck untouched.
    pub fn go_to(&mut self, index: usize) -> Result<usize, EffectError> {
        if index >= self.count {
            return Err(EffectError::SlideOutOfRange {
                index,
                count: self.count,
            });
        }

        self.index = index;
        Ok(self.index)
    }

    pub fn is_current(&self, index: usize) -> bool {
        self.index == index
    }
}

struct SliderInner {
    scheduler: Rc<dyn Scheduler>,
    deck: Cell<SlideDeck>,
    autoplay_ms: u32,
    autoplay: RefCell<Option<TimerLoop>>,
    paused: Cell<bool>,
    on_change: Box<dyn Fn(usize)>,
}

impl SliderInner {
    fn update(&self, apply: impl FnOnce(&mut SlideDeck) -> usize) -> usize {
        let mut deck = self.deck.get();
        let index = apply(&mut deck);
        self.deck.set(deck);
        (self.on_change)(index);
        index
    }

    fn arm(this: &Rc<Self>) {
        let weak: Weak<Self> = Rc::downgrade(this);
        let timer = TimerLoop::every(Rc::clone(&this.scheduler), this.autoplay_ms, move || {
            if let Some(inner) = weak.upgrade() {
                inner.update(SlideDeck::next);
            }
        });
        // The previous timer, if any, is cancelled as it drops.
        this.autoplay.replace(Some(timer));
    }

    fn disarm(&self) {
        drop(self.autoplay.take());
    }

    fn reset(this: &Rc<Self>) {
        this.disarm();
        if !this.paused.get() {
            Self::arm(this);
        }
    }
}

/// Slide deck with auto-play. Manual moves restart the auto-play interval;
/// hovering pauses it.
#[derive(Clone)]
pub struct SliderController {
    inner: Rc<SliderInner>,
}

impl SliderController {
    pub fn start(
        scheduler: Rc<dyn Scheduler>,
        slide_count: usize,
        autoplay_ms: u32,
        on_change: impl Fn(usize) + 'static,
    ) -> Result<Self, EffectError> {
        let inner = Rc::new(SliderInner {
            scheduler,
            deck: Cell::new(SlideDeck::new(slide_count)?),
            autoplay_ms,
            autoplay: RefCell::new(None),
            paused: Cell::new(false),
            on_change: Box::new(on_change),
        });
        SliderInner::arm(&inner);

        Ok(Self { inner })
    }

    pub fn current(&self) -> usize {
        self.inner.deck.get().index()
    }

    pub fn deck(&self) -> SlideDeck {
        self.inner.deck.get()
    }

    pub fn next(&self) -> usize {
        let index = self.inner.update(SlideDeck::next);
        SliderInner::reset(&self.inner);
        index
    }

    pub fn prev(&self) -> usize {
        let index = self.inner.update(SlideDeck::prev);
        SliderInner::reset(&self.inner);
        index
    }

    pub fn go_to(&self, index: usize) -> Result<usize, EffectError> {
        let mut deck = self.inner.deck.get();
        deck.go_to(index)?;

        let index = self.inner.update(|current| {
            *current = deck;
            current.index()
        });
        SliderInner::reset(&self.inner);
        Ok(index)
    }

    pub fn pause(&self) {
        self.inner.paused.set(true);
        self.inner.disarm();
    }

    pub fn resume(&self) {
        self.inner.paused.set(false);
        SliderInner::reset(&self.inner);
    }

    pub fn is_paused(&self) -> bool {
        self.inner.paused.get()
    }

    pub fn autoplay_active(&self) -> bool {
        self.inner
            .autoplay
            .borrow()
            .as_ref()
            .is_some_and(TimerLoop::is_active)
    }

    /// Stops auto-play for good; used on teardown.
    pub fn stop(&self) {
        self.inner.paused.set(true);
        self.inner.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;

    type Changes = Rc<RefCell<Vec<usize>>>;

    fn controller(count: usize, autoplay_ms: u32) -> (Rc<ManualScheduler>, SliderController, Changes) {
        let manual = Rc::new(ManualScheduler::new());
        let changes = Rc::new(RefCell::new(Vec::new()));
        let log = changes.clone();
        let slider = SliderController::start(manual.clone(), count, autoplay_ms, move |index| {
            log.borrow_mut().push(index)
        })
        .expect("non-empty slider");

        (manual, slider, changes)
    }

    #[test]
    fn empty_deck_is_rejected() {
        assert_eq!(SlideDeck::new(0), Err(EffectError::EmptySlider));
    }

    #[test]
    fn next_and_prev_are_cyclic_for_every_start() {
        for count in 1..=7 {
            for start in 0..count {
                let mut deck = SlideDeck::new(count).expect("non-empty");
                deck.go_to(start).expect("start in range");

                for _ in 0..count {
                    deck.next();
                }
                assert_eq!(deck.index(), start);

                for _ in 0..count {
                    deck.prev();
                }
                assert_eq!(deck.index(), start);
            }
        }
    }

    #[test]
    fn three_slides_advance_one_two_zero() {
        let mut deck = SlideDeck::new(3).expect("non-empty");

        let sequence: Vec<usize> = (0..3).map(|_| deck.next()).collect();

        assert_eq!(sequence, vec![1, 2, 0]);
    }

    #[test]
    fn prev_wraps_from_first_to_last() {
        let mut deck = SlideDeck::new(4).expect("non-empty");

        assert_eq!(deck.prev(), 3);
    }

    #[test]
    fn go_to_sets_exact_index_and_rejects_out_of_range() {
        let mut deck = SlideDeck::new(5).expect("non-empty");

        for target in 0..5 {
            assert_eq!(deck.go_to(target), Ok(target));
            assert!(deck.is_current(target));
        }

        assert_eq!(
            deck.go_to(5),
            Err(EffectError::SlideOutOfRange { index: 5, count: 5 })
        );
        assert_eq!(deck.index(), 4);
    }

    #[test]
    fn autoplay_advances_every_interval() {
        let (manual, slider, changes) = controller(3, 5_000);

        manual.advance(15_000.0);

        assert_eq!(*changes.borrow(), vec![1, 2, 0]);
        assert_eq!(slider.current(), 0);
    }

    #[test]
    fn manual_move_restarts_the_full_interval() {
        let (manual, slider, changes) = controller(3, 5_000);

        manual.advance(4_000.0);
        assert_eq!(slider.next(), 1);
        manual.advance(4_999.0);
        assert_eq!(*changes.borrow(), vec![1]);
        manual.advance(1.0);
        assert_eq!(*changes.borrow(), vec![1, 2]);
    }

    #[test]
    fn go_to_resets_timer_and_invalid_go_to_does_not() {
        let (manual, slider, changes) = controller(4, 1_000);

        manual.advance(600.0);
        assert_eq!(slider.go_to(3), Ok(3));
        manual.advance(600.0);
        assert!(slider.go_to(9).is_err());
        manual.advance(400.0);

        assert_eq!(*changes.borrow(), vec![3, 0]);
    }

    #[test]
    fn hover_pauses_and_leave_resumes() {
        let (manual, slider, changes) = controller(3, 1_000);

        slider.pause();
        manual.advance(10_000.0);
        assert!(changes.borrow().is_empty());
        assert!(!slider.autoplay_active());

        slider.prev();
        assert!(!slider.autoplay_active());
        manual.advance(10_000.0);
        assert_eq!(*changes.borrow(), vec![2]);

        slider.resume();
        manual.advance(1_000.0);
        assert_eq!(*changes.borrow(), vec![2, 0]);
        assert_eq!(manual.pending_timers(), 1);
    }

    #[test]
    fn stop_cancels_pending_autoplay() {
        let (manual, slider, _changes) = controller(2, 1_000);

        slider.stop();

        assert_eq!(manual.pending_timers(), 0);
        assert!(slider.is_paused());
    }
}
