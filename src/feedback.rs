use crate::pointer::Point;
use crate::scheduler::{Scheduler, TimerLoop};
use std::rc::Rc;

pub const SENDING_LABEL: &str = "Sending...";
pub const SENT_LABEL: &str = "Message Sent!";
pub const SUCCESS_BACKGROUND: &str = "#10b981";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ripple {
    pub id: u64,
    pub at: Point,
}

/// Ripples currently attached to one button.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RippleSet {
    next_id: u64,
    ripples: Vec<Ripple>,
}

impl RippleSet {
    pub fn add(&mut self, at: Point) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.ripples.push(Ripple { id, at });
        id
    }

    /// Ripples share one lifetime, so the oldest is always the next to go.
    pub fn expire_oldest(&mut self) -> Option<Ripple> {
        if self.ripples.is_empty() {
            return None;
        }
        Some(self.ripples.remove(0))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ripple> {
        self.ripples.iter()
    }

    pub fn len(&self) -> usize {
        self.ripples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ripples.is_empty()
    }
}

pub fn schedule_ripple_removal(
    scheduler: &dyn Scheduler,
    lifetime_ms: u32,
    remove: impl FnOnce() + 'static,
) {
    scheduler.set_timeout(lifetime_ms, Box::new(remove));
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Sending,
    Sent,
}

impl SubmitPhase {
    pub fn label<'a>(self, original: &'a str) -> &'a str {
        match self {
            Self::Idle => original,
            Self::Sending => SENDING_LABEL,
            Self::Sent => SENT_LABEL,
        }
    }

    pub fn background(self) -> Option<&'static str> {
        match self {
            Self::Sent => Some(SUCCESS_BACKGROUND),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Sending => "sending",
            Self::Sent => "sent",
        }
    }
}

/// Fakes a form submission: `Sending` now, `Sent` after `sending_ms`, back
/// to `Idle` after a further `sent_ms`. There is no failure outcome, and
/// overlapping runs are not coordinated.
pub fn run_mock_submission(
    scheduler: Rc<dyn Scheduler>,
    sending_ms: u32,
    sent_ms: u32,
    mut on_phase: impl FnMut(SubmitPhase) + 'static,
) {
    on_phase(SubmitPhase::Sending);

    let mut phase = SubmitPhase::Sending;
    TimerLoop::start(scheduler, sending_ms, move || {
        phase = match phase {
            SubmitPhase::Sending => SubmitPhase::Sent,
            SubmitPhase::Sent | SubmitPhase::Idle => SubmitPhase::Idle,
        };
        on_phase(phase);

        (phase == SubmitPhase::Sent).then_some(sent_ms)
    })
    .detach();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use std::cell::RefCell;

    #[test]
    fn ripples_get_unique_ids_and_expire_in_order() {
        let mut set = RippleSet::default();
        let first = set.add(Point::new(1.0, 2.0));
        let second = set.add(Point::new(3.0, 4.0));

        assert_ne!(first, second);
        assert_eq!(set.expire_oldest().map(|ripple| ripple.id), Some(first));
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().map(|ripple| ripple.id), Some(second));
        assert_eq!(set.expire_oldest().map(|ripple| ripple.at), Some(Point::new(3.0, 4.0)));
        assert_eq!(set.expire_oldest(), None);
    }

    #[test]
    fn ripple_is_removed_after_its_lifetime() {
        let manual = Rc::new(ManualScheduler::new());
        let set = Rc::new(RefCell::new(RippleSet::default()));

        set.borrow_mut().add(Point::new(5.0, 5.0));
        let handle = set.clone();
        schedule_ripple_removal(&*manual, 600, move || {
            handle.borrow_mut().expire_oldest();
        });

        manual.advance(599.0);
        assert_eq!(set.borrow().len(), 1);
        manual.advance(1.0);
        assert!(set.borrow().is_empty());
    }

    #[test]
    fn mock_submission_walks_through_phases_on_time() {
        let manual = Rc::new(ManualScheduler::new());
        let phases = Rc::new(RefCell::new(Vec::new()));

        let log = phases.clone();
        run_mock_submission(manual.clone(), 1_000, 2_000, move |phase| {
            log.borrow_mut().push(phase)
        });

        assert_eq!(*phases.borrow(), vec![SubmitPhase::Sending]);
        manual.advance(1_000.0);
        assert_eq!(*phases.borrow(), vec![SubmitPhase::Sending, SubmitPhase::Sent]);
        manual.advance(1_999.0);
        assert_eq!(phases.borrow().len(), 2);
        manual.advance(1.0);
        assert_eq!(
            *phases.borrow(),
            vec![SubmitPhase::Sending, SubmitPhase::Sent, SubmitPhase::Idle]
        );
        assert_eq!(manual.pending_timers(), 0);
    }

    #[test]
    fn phase_labels_restore_the_original_text() {
        assert_eq!(SubmitPhase::Sending.label("Send Message"), "Sending...");
        assert_eq!(SubmitPhase::Sent.label("Send Message"), "Message Sent!");
        assert_eq!(SubmitPhase::Idle.label("Send Message"), "Send Message");
        assert_eq!(SubmitPhase::Sent.background(), Some("#10b981"));
        assert_eq!(SubmitPhase::Idle.background(), None);
    }
}
