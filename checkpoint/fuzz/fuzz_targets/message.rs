#![no_main]

use arbitrary::Arbitrary;
use commonware_checkpoint::Message;
use commonware_codec::{DecodeExt, Encode};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    sequence: u64,
    agent: u64,
    x: u64,
    y: u64,
    checksum: u64,
    raw: Vec<u8>,
}

fn check(message: &Message) -> bool {
    if message.agent == 0 {
        return true;
    }
    if message.agent > 3_000 || message.x > 15_000 {
        return false;
    }
    if message.y < 5_000 || message.y > 20_000 || message.y <= message.x {
        return false;
    }
    message.agent + message.x + message.y == message.checksum
}

fn fuzz(input: FuzzInput) {
    let message = Message {
        sequence: input.sequence,
        agent: input.agent,
        x: input.x,
        y: input.y,
        checksum: input.checksum,
    };
    assert_eq!(message.validate(), check(&message));

    let encoded = message.encode();
    let decoded = Message::decode(&encoded[..]).expect("Failed to decode a successfully encoded input!");
    assert_eq!(decoded, message);

    if let Ok(decoded) = Message::decode(&input.raw[..]) {
        assert_eq!(decoded.validate(), check(&decoded));
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
