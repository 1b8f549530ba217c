use clap::Parser;
use rml_rtmp_framing::chunk_io::ChunkDeserializer;
use rml_rtmp_framing::handshake::PACKET_SIZE;
use rml_rtmp_framing::messages::{MessagePayload, MessageType, SetChunkSize};
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

const PRINTED_PAYLOAD_BYTES: usize = 100;

/// Reads raw binary logged from the client to server direction of an RTMP connection
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// The file containing the raw bytes
    file: PathBuf,

    /// The file starts with the client's side of the handshake (C0, C1 and C2)
    #[arg(long)]
    skip_handshake: bool,

    /// Wait for enter to be pressed after every message
    #[arg(long)]
    pause: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    println!("RTMP Log reader");
    println!("Reading file: {}", args.file.display());
    println!();

    let file = BufReader::new(File::open(&args.file)?);
    let stdout = io::stdout();
    let stdin = io::stdin();
    let mut output = stdout.lock();
    let mut pause_input = if args.pause { Some(stdin.lock()) } else { None };

    let count = read_log(file, args.skip_handshake, &mut output, |_| match pause_input.as_mut() {
        Some(input) => {
            println!("Press enter to read next message");
            let mut line = String::new();
            input.read_line(&mut line).map(|_| ())
        }

        None => Ok(()),
    })?;

    writeln!(output, "Finished reading log file!  {} messages read", count)?;
    Ok(())
}

/// Reassembles every message in the log, writing a description of each to `output`.
/// `after_message` is called once a message has been written.
fn read_log<R, W, F>(
    reader: R,
    skip_handshake: bool,
    output: &mut W,
    mut after_message: F,
) -> Result<u32, Box<dyn Error>>
where
    R: Read,
    W: Write,
    F: FnMut(&MessagePayload) -> io::Result<()>,
{
    let mut deserializer = ChunkDeserializer::new();
    let mut bytes = reader.bytes();
    let mut current_index: usize = 0;
    let mut last_message_end_index: usize = 0;
    let mut message_number = 0;

    if skip_handshake {
        for _ in 0..(1 + PACKET_SIZE * 2) {
            match bytes.next() {
                Some(byte) => byte?,
                None => return Err("File ended before the end of the handshake".into()),
            };

            current_index += 1;
        }

        last_message_end_index = current_index;
    }

    // Bytes are fed in one at a time so the offset of each message is known
    for byte in bytes {
        let byte = [byte?];
        current_index += 1;

        let mut input: &[u8] = &byte;
        while let Some(payload) = deserializer.get_next_message(input)? {
            input = &[];
            message_number += 1;

            write_message(output, message_number, last_message_end_index, &payload)?;
            if payload.message_type() == MessageType::SetChunkSize {
                let message = SetChunkSize::deserialize(&payload.data[..])?;
                deserializer.set_max_chunk_size(message.size as usize)?;
            }

            after_message(&payload)?;
            last_message_end_index = current_index;
        }
    }

    if let Err(error) = deserializer.end_of_stream() {
        writeln!(output, "Log ended with a partial chunk: {}", error)?;
    }

    Ok(message_number)
}

fn write_message<W: Write>(
    output: &mut W,
    number: u32,
    index: usize,
    payload: &MessagePayload,
) -> io::Result<()> {
    writeln!(
        output,
        "Message: {}   Timestamp: {}   Type: {:?} ({})   Csid: {}   Stream_Id: {}   index: {} ({:x})",
        number,
        payload.timestamp.value,
        payload.message_type(),
        payload.type_id,
        payload.chunk_stream_id,
        payload.message_stream_id,
        index,
        index
    )?;

    write!(output, "data: ")?;
    for byte in payload.data.iter().take(PRINTED_PAYLOAD_BYTES) {
        write!(output, "{:02x}", byte)?;
    }

    if payload.data.len() > PRINTED_PAYLOAD_BYTES {
        write!(output, ".. ({})", payload.data.len())?;
    }

    writeln!(output)?;
    writeln!(output)
}
