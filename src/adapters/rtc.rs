//! RTC slow-memory session store.
//!
//! The session struct lives in a `.rtc.data` static, which the RTC domain
//! keeps powered through deep sleep.  Its initializer is applied on
//! power-on reset only, so a timer or edge wake sees exactly the bytes the
//! previous boot stored.  The caller still resets the session on a cold
//! boot — retention memory after a brownout is not trusted.
//!
//! On the host the "retention memory" is a process-global, which gives the
//! same load/store semantics within one test process.

use crate::session::PersistentSession;

#[cfg(target_os = "espidf")]
#[unsafe(link_section = ".rtc.data")]
static mut RTC_SESSION: PersistentSession = PersistentSession::cold_boot();

#[cfg(not(target_os = "espidf"))]
static SIM_SESSION: std::sync::Mutex<PersistentSession> =
    std::sync::Mutex::new(PersistentSession::cold_boot());

pub struct RtcSessionStore;

impl RtcSessionStore {
    pub fn new() -> Self {
        Self
    }

    #[cfg(target_os = "espidf")]
    pub fn load(&self) -> PersistentSession {
        // SAFETY: the static is only touched from the single-threaded boot
        // path; load at boot, store before sleep, nothing in between.
        unsafe { core::ptr::read(&raw const RTC_SESSION) }
    }

    #[cfg(target_os = "espidf")]
    pub fn store(&mut self, session: &PersistentSession) {
        // SAFETY: see load().
        unsafe { core::ptr::write(&raw mut RTC_SESSION, *session) }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn load(&self) -> PersistentSession {
        *SIM_SESSION.lock().unwrap()
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn store(&mut self, session: &PersistentSession) {
        *SIM_SESSION.lock().unwrap() = *session;
    }
}

impl Default for RtcSessionStore {
    fn default() -> Self {
        Self::new()
    }
}
