use crate::controller::GameEvent;
use crate::mpris::MprisHandle;

/// Mirror status and title changes into the MPRIS snapshot.
pub fn update_mpris(mpris: &MprisHandle, event: &GameEvent) {
    match event {
        GameEvent::TrackStarted(info) => mpris.set_now_playing(Some(info)),
        GameEvent::StatusChanged(status) => mpris.set_status(*status),
        _ => {}
    }
}
