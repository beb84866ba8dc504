/// Non-blocking stand-in for a delay inside a polled loop
///
/// Holds the earliest time the next action is allowed. Time is a wrapping millisecond counter,
/// so comparisons are done on the wrapped difference.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pacer {
    next: u32,
}

impl Pacer {
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Returns true at most once every `delay` ms
    pub fn ready(&mut self, now: u32, delay: u32) -> bool {
        if (now.wrapping_sub(self.next) as i32) < 0 {
            return false;
        }
        self.next = now.wrapping_add(delay);
        true
    }

    /// Make the next call to `ready` fire regardless of time
    pub fn fire(&mut self, now: u32) {
        self.next = now;
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn test_pacer() {
        let mut p = Pacer::new();
        assert!(p.ready(0, 30));
        assert!(!p.ready(1, 30));
        assert!(!p.ready(29, 30));
        assert!(p.ready(30, 30));
        // A late poll schedules from the poll time, not the missed deadline
        assert!(p.ready(100, 30));
        assert!(!p.ready(129, 30));
        assert!(p.ready(130, 30));
    }

    #[test]
    fn test_pacer_wraps() {
        let mut p = Pacer::new();
        assert!(p.ready(u32::MAX - 10, 30));
        assert!(!p.ready(u32::MAX, 30));
        assert!(!p.ready(18, 30));
        assert!(p.ready(19, 30));
    }

    #[test]
    fn test_fire() {
        let mut p = Pacer::new();
        assert!(p.ready(0, 500));
        p.fire(10);
        assert!(p.ready(10, 500));
        assert!(!p.ready(11, 500));
    }
}
