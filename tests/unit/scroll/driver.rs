use super::*;

#[test]
fn tickets_are_sequential() {
    let mut d = RecordingScrollDriver::new();
    assert_eq!(d.smooth_scroll_to(100.0), ScrollTicket(0));
    assert_eq!(d.smooth_scroll_to(900.0), ScrollTicket(1));
    assert_eq!(d.last_smooth(), Some((ScrollTicket(1), 900.0)));
}

#[test]
fn shared_driver_records_through_handle() {
    let shared = RecordingScrollDriver::shared();
    let mut handle = shared.clone();
    handle.scroll_into_view("contact");
    assert_eq!(shared.borrow().into_view_count(), 1);
    assert_eq!(
        shared.borrow().requests()[0],
        ScrollRequest::IntoView {
            anchor_id: "contact".to_string()
        }
    );
    assert_eq!(shared.borrow().last_smooth(), None);
}
