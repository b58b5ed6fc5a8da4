use super::*;
use crate::animation::timeline::TweenTimeline;
use crate::foundation::core::Rect;

fn anchor(id: &str) -> Rc<SectionAnchor> {
    SectionAnchor::new(id, Rect::new(0.0, 0.0, 100.0, 100.0))
}

fn card(anchor: &Rc<SectionAnchor>) -> CardDescriptor {
    CardDescriptor::new(anchor, Box::new(TweenTimeline::empty()))
}

fn assert_dense(reg: &CardRegistry) {
    let indices: Vec<usize> = reg.iter().map(|d| d.index()).collect();
    let expected: Vec<usize> = (0..reg.len()).collect();
    assert_eq!(indices, expected);
    assert_eq!(reg.slot_count(), reg.len());
    for d in reg.iter() {
        assert_eq!(reg.index_of(d.id()), Some(d.index()));
    }
}

#[test]
fn register_assigns_sequential_indices() {
    let anchors: Vec<_> = ["hero", "about", "work"].iter().map(|id| anchor(id)).collect();
    let mut reg = CardRegistry::new();
    for (i, a) in anchors.iter().enumerate() {
        assert_eq!(reg.register(card(a)).unwrap(), i);
    }
    assert_eq!(reg.index_of("work"), Some(2));
    assert_eq!(reg.get(1).unwrap().id(), "about");
    assert_eq!(reg.ids(), vec!["hero", "about", "work"]);
    assert_dense(&reg);
}

#[test]
fn duplicate_id_is_rejected() {
    let a = anchor("hero");
    let mut reg = CardRegistry::new();
    reg.register(card(&a)).unwrap();
    let err = reg.register(card(&a)).unwrap_err();
    assert!(matches!(err, CardError::DuplicateId(id) if id == "hero"));
    assert_eq!(reg.len(), 1);
}

#[test]
fn unregister_kills_timeline_and_holds_slot() {
    let anchors: Vec<_> = ["a", "b", "c"].iter().map(|id| anchor(id)).collect();
    let mut reg = CardRegistry::new();
    for a in &anchors {
        reg.register(card(a)).unwrap();
    }
    let removed = reg.unregister("b").unwrap();
    assert!(removed.timeline().is_killed());
    assert_eq!(reg.index_of("b"), None);
    assert!(reg.get(1).is_none());
    assert_eq!(reg.get(2).unwrap().index(), 2);
    assert!(reg.has_vacancies());

    // held slots are not reused
    let d = anchor("d");
    assert_eq!(reg.register(card(&d)).unwrap(), 3);
    assert!(reg.unregister("b").is_none());
}

#[test]
fn reclaim_compacts_and_reports_remap() {
    let anchors: Vec<_> = ["a", "b", "c", "d"].iter().map(|id| anchor(id)).collect();
    let mut reg = CardRegistry::new();
    for a in &anchors {
        reg.register(card(a)).unwrap();
    }
    reg.unregister("a");
    reg.unregister("c");
    let remap = reg.reclaim().unwrap();
    assert_eq!(remap, vec![None, Some(0), None, Some(1)]);
    assert_eq!(reg.index_of("d"), Some(1));
    assert_dense(&reg);
    assert!(reg.reclaim().is_none());
}

#[test]
fn indices_stay_dense_under_mixed_sequences() {
    let pool: Vec<_> = (0..8).map(|i| anchor(&format!("s{i}"))).collect();
    let mut reg = CardRegistry::new();
    // deterministic pseudo-random walk over register/unregister
    let mut x: u64 = 0x2545_f491_4f6c_dd1d;
    for _ in 0..200 {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        let a = &pool[(x % pool.len() as u64) as usize];
        if reg.index_of(a.id()).is_some() {
            reg.unregister(a.id());
        } else {
            reg.register(card(a)).unwrap();
        }
        reg.reclaim();
        assert_dense(&reg);
    }
}

#[test]
fn threshold_is_clamped() {
    let a = anchor("a");
    assert_eq!(card(&a).with_threshold(1.5).activation_threshold(), 1.0);
    assert_eq!(card(&a).with_threshold(-0.5).activation_threshold(), 0.0);
    assert_eq!(card(&a).with_threshold(f64::NAN).activation_threshold(), 0.0);
}

#[test]
fn descriptor_holds_weak_anchor() {
    let a = anchor("a");
    let desc = card(&a);
    assert!(desc.anchor().is_some());
    drop(a);
    assert!(desc.anchor().is_none());
}
