// Communication channels lock-free

use crate::messaging::command::Command;
use ringbuf::{HeapRb, traits::Split};

pub type CommandProducer = ringbuf::HeapProd<Command>;
pub type CommandConsumer = ringbuf::HeapCons<Command>;

/// Create a single-producer/single-consumer command channel
///
/// The producer side lives on the control surface thread, the consumer
/// side on the audio thread; commands enqueued before a block are
/// applied before that block is rendered.
pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<Command>::new(capacity);
    rb.split()
}
