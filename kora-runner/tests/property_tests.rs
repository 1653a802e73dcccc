//! Property tests for the runner's session state.
//!
//! Uses proptest to verify:
//! 1. Chat transcript keeps send order whatever order replies arrive in
//! 2. The chart slot never holds more than one live instance

use proptest::prelude::*;
use kora_core::view::{build_chart, ChartMode, ChartView};
use kora_core::PricePoint;
use kora_runner::{BackendError, ChartSlot, ChatSession, RecordingSink, Speaker};

// ── Strategies (proptest) ────────────────────────────────────────────

/// Questions plus a permutation deciding the order their replies land in.
fn arb_exchange() -> impl Strategy<Value = (Vec<String>, Vec<usize>)> {
    prop::collection::vec("[a-z가-힣]{1,12}", 1..8).prop_flat_map(|questions| {
        let order: Vec<usize> = (0..questions.len()).collect();
        (Just(questions), Just(order).prop_shuffle())
    })
}

#[derive(Debug, Clone, Copy)]
enum SlotOp {
    Render,
    RenderEmpty,
    Destroy,
}

fn arb_ops() -> impl Strategy<Value = Vec<SlotOp>> {
    prop::collection::vec(
        prop_oneof![
            3 => Just(SlotOp::Render),
            1 => Just(SlotOp::RenderEmpty),
            1 => Just(SlotOp::Destroy),
        ],
        0..40,
    )
}

fn view() -> Option<ChartView> {
    let history = vec![
        PricePoint::new("2024-01-02", 100.0),
        PricePoint::new("2024-01-03", 101.0),
    ];
    build_chart(ChartMode::OneYear, &history, None)
}

// ── 1. Chat ordering ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn chat_transcript_keeps_send_order(
        (questions, order) in arb_exchange(),
        failing in any::<bool>(),
    ) {
        let mut chat = ChatSession::new("{}");
        let pending: Vec<_> = questions
            .iter()
            .filter_map(|q| chat.begin(q))
            .collect();
        prop_assert_eq!(pending.len(), questions.len());

        for i in order {
            let result = if failing && i % 2 == 1 {
                Err(BackendError::Transport("reset".into()))
            } else {
                Ok(format!("answer {i}"))
            };
            prop_assert!(chat.resolve(pending[i].id, result));
        }

        prop_assert_eq!(chat.pending_count(), 0);
        let messages = chat.messages();
        prop_assert_eq!(messages.len(), questions.len() * 2);
        for (i, pair) in messages.chunks(2).enumerate() {
            prop_assert_eq!(pair[0].speaker, Speaker::User);
            prop_assert_eq!(&pair[0].text, &questions[i]);
            prop_assert_eq!(pair[1].speaker, Speaker::Bot);
            prop_assert_eq!(pair[1].id, pending[i].id);
            if !(failing && i % 2 == 1) {
                prop_assert_eq!(&pair[1].text, &format!("answer {i}"));
            }
        }
    }

    #[test]
    fn resolving_twice_is_refused(questions in prop::collection::vec("[a-z]{1,8}", 1..5)) {
        let mut chat = ChatSession::new("{}");
        let ids: Vec<u64> = questions.iter().filter_map(|q| chat.begin(q)).map(|p| p.id).collect();
        for id in &ids {
            prop_assert!(chat.resolve(*id, Ok("first".into())));
            prop_assert!(!chat.resolve(*id, Ok("second".into())));
        }
        prop_assert!(chat.messages().iter().filter(|m| m.speaker == Speaker::Bot).all(|m| m.text == "first"));
    }
}

// ── 2. Chart slot ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn chart_slot_holds_at_most_one_instance(ops in arb_ops()) {
        let sink = RecordingSink::new();
        let mut slot = ChartSlot::new();
        for op in ops {
            match op {
                SlotOp::Render => slot.render(view(), &sink),
                SlotOp::RenderEmpty => slot.render(None, &sink),
                SlotOp::Destroy => slot.destroy(&sink),
            }
            prop_assert!(slot.live_count() <= 1);
            prop_assert_eq!(slot.live_count(), usize::from(slot.current().is_some()));
        }

        let kinds = sink.kinds();
        let created = kinds.iter().filter(|k| **k == "chart_created").count();
        let destroyed = kinds.iter().filter(|k| **k == "chart_destroyed").count();
        prop_assert_eq!(created - destroyed, slot.live_count());
    }
}
