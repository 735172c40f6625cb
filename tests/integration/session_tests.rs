//! Session integration tests against a scripted pedal

use c4_hid::core::config::TimingConfig;
use c4_hid::hid::{build_read_request, HidTransport, PresetIndex};
use c4_hid::{PedalError, PresetSession, TransportError};
use std::collections::HashMap;

/// Pedal answering each read with a canned block after a number of empty polls
#[derive(Default)]
struct ScriptedPedal {
    blocks: HashMap<u8, Vec<u8>>,
    empty_polls_before_answer: usize,
    pending: Option<(Vec<u8>, usize)>,
    writes: Vec<Vec<u8>>,
}

impl ScriptedPedal {
    /// Every slot answers with the empty marker
    fn all_empty() -> Self {
        (0..128).fold(Self::default(), |pedal, index| pedal.answer(index, empty_block()))
    }

    fn answer(mut self, index: u8, block: Vec<u8>) -> Self {
        self.blocks.insert(index, block);
        self
    }

    fn named(self, index: u8, name: &str) -> Self {
        let mut block = vec![0x36];
        block.extend_from_slice(name.as_bytes());
        block.resize(38, 0x00);
        self.answer(index, block)
    }

    fn slow(mut self, empty_polls: usize) -> Self {
        self.empty_polls_before_answer = empty_polls;
        self
    }
}

impl HidTransport for ScriptedPedal {
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        self.writes.push(data.to_vec());
        if data[0] == 0x36 {
            let addr = ((data[1] as u32) << 16) | ((data[2] as u32) << 8);
            let slot = ((addr - 0x80000) / 0x1000) as u8;
            self.pending = self
                .blocks
                .get(&slot)
                .map(|block| (block.clone(), self.empty_polls_before_answer));
        }
        Ok(data.len())
    }

    fn read_timeout(&mut self, buf: &mut [u8], _timeout_ms: i32) -> Result<usize, TransportError> {
        match self.pending.take() {
            Some((block, 0)) => {
                let len = block.len().min(buf.len());
                buf[..len].copy_from_slice(&block[..len]);
                Ok(len)
            }
            Some((block, polls)) => {
                self.pending = Some((block, polls - 1));
                Ok(0)
            }
            None => Ok(0),
        }
    }
}

fn timing(response_timeout_ms: u64) -> TimingConfig {
    TimingConfig {
        settle_ms: 0,
        poll_timeout_ms: 0,
        response_timeout_ms,
        max_stale_reports: 4,
    }
}

fn empty_block() -> Vec<u8> {
    let mut block = vec![0xFF; 38];
    block[0] = 0x36;
    block
}

#[test]
fn test_scan_sends_every_read_request_in_order() {
    let mut session = PresetSession::with_transport(ScriptedPedal::default(), timing(0));
    let presets = session.discover_presets().unwrap();
    assert!(presets.is_empty());

    let writes = &session.transport().unwrap().writes;
    assert_eq!(writes.len(), 128);
    for (index, write) in writes.iter().enumerate() {
        assert_eq!(write.as_slice(), build_read_request(index as u8).unwrap());
    }
}

#[test]
fn test_empty_marker_skips_slot() {
    let pedal = ScriptedPedal::default()
        .named(2, "Lead")
        .answer(3, empty_block())
        .named(4, "Pad");
    let mut session = PresetSession::with_transport(pedal, timing(0));

    let presets = session.discover_presets().unwrap();
    let names: Vec<(u16, &str)> = presets
        .iter()
        .map(|r| (r.index.display_number(), r.name.as_str()))
        .collect();
    assert_eq!(names, vec![(3, "Lead"), (5, "Pad")]);
}

#[test]
fn test_slow_answer_within_budget() {
    let pedal = ScriptedPedal::all_empty().named(10, "Slow Poke").slow(3);
    let mut session = PresetSession::with_transport(pedal, timing(500));

    let presets = session.discover_presets().unwrap();
    assert_eq!(presets.len(), 1);
    assert_eq!(presets.as_slice()[0].name.as_str(), "Slow Poke");
}

#[test]
fn test_slow_answer_without_budget_is_absent() {
    let pedal = ScriptedPedal::default().named(10, "Slow Poke").slow(3);
    let mut session = PresetSession::with_transport(pedal, timing(0));

    assert!(session.discover_presets().unwrap().is_empty());
}

#[test]
fn test_echo_mismatch_still_decodes() {
    let mut block = vec![0x00];
    block.extend_from_slice(b"No Echo");
    block.resize(38, b' ');
    let pedal = ScriptedPedal::default().answer(0, block);
    let mut session = PresetSession::with_transport(pedal, timing(0));

    let presets = session.discover_presets().unwrap();
    assert_eq!(presets.as_slice()[0].name.as_str(), "No Echo");
}

#[test]
fn test_short_response_is_malformed() {
    let pedal = ScriptedPedal::default().answer(7, vec![0x36, b'X', b'Y']);
    let mut session = PresetSession::with_transport(pedal, timing(0));

    assert!(matches!(
        session.discover_presets(),
        Err(PedalError::MalformedResponse {
            expected: 33,
            actual: 3
        })
    ));
}

#[test]
fn test_malformed_rescan_keeps_previous_list() {
    let pedal = ScriptedPedal::default().named(3, "Keeper").named(90, "Also Kept");
    let mut session = PresetSession::with_transport(pedal, timing(0));
    let first = session.discover_presets().unwrap().clone();
    assert_eq!(first.len(), 2);

    session
        .transport_mut()
        .unwrap()
        .blocks
        .insert(7, vec![0x36, b'X', b'Y']);
    assert!(matches!(
        session.discover_presets(),
        Err(PedalError::MalformedResponse { .. })
    ));
    assert_eq!(session.presets(), &first);
}

#[test]
fn test_discovery_twice_yields_same_list() {
    let pedal = ScriptedPedal::default()
        .named(0, "One")
        .named(64, "Two")
        .named(127, "Three");
    let mut session = PresetSession::with_transport(pedal, timing(0));

    let first = session.discover_presets().unwrap().clone();
    let second = session.discover_presets().unwrap().clone();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_select_by_display_number() {
    let mut session = PresetSession::with_transport(ScriptedPedal::default(), timing(0));

    let index = PresetIndex::from_display_number(6).unwrap();
    session.select_preset(index.value()).unwrap();

    assert_eq!(session.transport().unwrap().writes, vec![vec![0x77, 5]]);
    assert_eq!(session.active_preset(), Some(index));
}

#[test]
fn test_select_after_close() {
    let mut session = PresetSession::with_transport(ScriptedPedal::default(), timing(0));
    session.close();
    session.close();

    assert!(matches!(
        session.select_preset(5),
        Err(PedalError::SessionClosed)
    ));
    assert!(session.transport().is_none());
}
