#![no_main]

use arbitrary::Arbitrary;
use commonware_checkpoint::{
    log::Journal,
    reducer::{Config, Reducer},
    Error, Log, Message,
};
use futures::executor::block_on;
use libfuzzer_sys::fuzz_target;
use std::num::NonZeroUsize;

#[derive(Arbitrary, Debug)]
enum Operation {
    Append {
        sequence: u64,
        agent: u16,
        x: u16,
        y: u16,
        tweak: bool,
    },
    Reduce {
        max: u8,
    },
    Replay,
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    batch_size: u8,
    operations: Vec<Operation>,
}

fn fuzz(input: FuzzInput) {
    let batch_size = NonZeroUsize::new(input.batch_size as usize).unwrap_or(NonZeroUsize::MIN);
    block_on(async {
        let mut journal = Journal::new(());
        let mut reducer = Reducer::new(Config {
            batch_size,
            reporter: (),
        });
        let mut admitted = 0;
        let mut last = None;

        for operation in input.operations {
            match operation {
                Operation::Append {
                    sequence,
                    agent,
                    x,
                    y,
                    tweak,
                } => {
                    let (agent, x, y) = (agent as u64, x as u64, y as u64);
                    let message = Message {
                        sequence,
                        agent,
                        x,
                        y,
                        checksum: agent + x + y + tweak as u64,
                    };
                    match journal.append(message).await {
                        Ok(_) => {
                            assert!(message.validate());
                            admitted += 1;
                        }
                        Err(Error::Rejected) => assert!(!message.validate()),
                        Err(err) => panic!("unexpected error: {err}"),
                    }
                    assert_eq!(journal.len(), admitted);
                }
                Operation::Reduce { max } => {
                    let before = *reducer.checkpoint();
                    let pending = journal.pending(before.processed, max as usize).await.unwrap();
                    let end = pending.last().map(|e| e.cursor).unwrap_or(before.processed);
                    match reducer.reduce(&mut journal, before.processed, end).await {
                        Ok(after) => {
                            assert!(pending.len() <= batch_size.get());
                            assert!(after.summary >= before.summary);
                            assert_eq!(after.synced, after.processed == journal.tip().await.unwrap());
                            last = Some((before.processed, end));
                        }
                        Err(Error::CapacityExceeded { requested, max }) => {
                            assert_eq!(requested, pending.len());
                            assert_eq!(max, batch_size.get());
                            assert_eq!(reducer.checkpoint(), &before);
                        }
                        Err(err) => panic!("unexpected error: {err}"),
                    }
                }
                Operation::Replay => {
                    let Some((start, end)) = last else {
                        continue;
                    };
                    if start == end {
                        continue;
                    }
                    let before = *reducer.checkpoint();
                    assert!(matches!(
                        reducer.reduce(&mut journal, start, end).await,
                        Err(Error::CursorMismatch { .. })
                    ));
                    assert_eq!(reducer.checkpoint(), &before);
                }
            }
        }
    });
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
