use log::debug;

use crate::codec::CodecSession;

/// Owns a codec session and releases it exactly once: on `close`, or on drop
/// if nobody closed it first.
pub struct SessionGuard<S: CodecSession> {
    session: Option<S>,
}

impl<S: CodecSession> SessionGuard<S> {
    pub fn new(session: S) -> SessionGuard<S> {
        SessionGuard { session: Some(session) }
    }

    pub fn get(&self) -> Option<&S> {
        self.session.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut S> {
        self.session.as_mut()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Releases the session. Returns `false` if it was already released.
    pub fn close(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                debug!("releasing codec session");
                session.close();
                true
            }
            None => false,
        }
    }
}

impl<S: CodecSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::Frames;

    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingSession(Rc<Cell<u32>>);

    impl CodecSession for CountingSession {
        fn samples_per_frame(&self) -> Frames {
            Frames::new(1)
        }

        fn max_coded_frame_size(&self) -> usize {
            1
        }

        fn encode_quantum(&mut self, _frame: &mut [u8], _samples: &[f32]) -> i32 {
            0
        }

        fn close(self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn close_runs_once() {
        let closes = Rc::new(Cell::new(0));
        let mut guard = SessionGuard::new(CountingSession(closes.clone()));

        assert!(guard.close());
        assert!(!guard.close());
        assert!(!guard.is_open());
        drop(guard);

        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn drop_closes() {
        let closes = Rc::new(Cell::new(0));
        {
            let _guard = SessionGuard::new(CountingSession(closes.clone()));
        }
        assert_eq!(closes.get(), 1);
    }
}
