//! Decoding raw bytes into the character stream.
//!
//! Programs write bytes, not characters. [`ByteStream`] sits in front
//! of a [`Stream`] and decodes incrementally against an ordered list of
//! `(encoding, error policy)` pairs: when the active encoding reports a
//! malformed sequence and its policy is strict, the next pair takes
//! over at the offending byte; once the list is exhausted the offending
//! bytes are skipped.

use encoding_rs::{CoderResult, Decoder, DecoderResult, Encoding, UTF_8, WINDOWS_1252};

use stream::Stream;

/// What to do with a byte sequence the active encoding cannot decode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Hand the input over to the next fallback encoding.
    Strict,
    /// Substitute U+FFFD and carry on.
    Replace,
    /// Drop the malformed bytes and carry on.
    Ignore,
}

/// A byte-fed front end for a [`Stream`].
pub struct ByteStream {
    stream: Stream,
    encodings: Vec<(&'static Encoding, ErrorPolicy)>,
    active: usize,
    decoder: Decoder,
}

impl ByteStream {
    /// Wrap `stream` with the default fallback list: strict UTF-8,
    /// then windows-1252 (the WHATWG rendition of latin-1) with
    /// replacement.
    pub fn new(stream: Stream) -> ByteStream {
        ByteStream::with_encodings(
            stream,
            vec![
                (UTF_8, ErrorPolicy::Strict),
                (WINDOWS_1252, ErrorPolicy::Replace),
            ],
        )
    }

    pub fn with_encodings(
        stream: Stream,
        encodings: Vec<(&'static Encoding, ErrorPolicy)>,
    ) -> ByteStream {
        assert!(!encodings.is_empty(), "need at least one encoding");
        let decoder = encodings[0].0.new_decoder();
        ByteStream {
            stream: stream,
            encodings: encodings,
            active: 0,
            decoder: decoder,
        }
    }

    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut Stream {
        &mut self.stream
    }

    /// Decode `bytes` and forward the characters to the inner stream.
    ///
    /// Multi-byte sequences split across calls are buffered by the
    /// decoder and complete on a later call.
    pub fn feed(&mut self, bytes: &[u8]) {
        let mut output = String::new();
        output.reserve(bytes.len() + 16);
        let mut input = bytes;
        loop {
            let policy = self.encodings[self.active].1;
            if policy == ErrorPolicy::Replace {
                let (result, read, _) = self.decoder.decode_to_string(input, &mut output, false);
                input = &input[read..];
                match result {
                    CoderResult::InputEmpty => break,
                    CoderResult::OutputFull => output.reserve(input.len() * 3 + 16),
                }
            } else {
                let (result, read) =
                    self.decoder
                        .decode_to_string_without_replacement(input, &mut output, false);
                match result {
                    DecoderResult::InputEmpty => break,
                    DecoderResult::OutputFull => {
                        input = &input[read..];
                        output.reserve(input.len() * 3 + 16);
                    }
                    DecoderResult::Malformed(bad, extra) => {
                        // `extra` of the malformed bytes came from the
                        // decoder's carry-over buffer, so only
                        // `bad - extra` of them sit in this slice; the
                        // carried part of a sequence that started in an
                        // earlier feed cannot be replayed, hence the
                        // saturation.
                        let resume = (read + extra as usize).saturating_sub(bad as usize);
                        if policy == ErrorPolicy::Strict && self.active + 1 < self.encodings.len()
                        {
                            self.active += 1;
                            self.decoder = self.encodings[self.active].0.new_decoder();
                            input = &input[resume..];
                        } else {
                            // Out of fallbacks (or ignoring): skip the
                            // offending bytes.
                            input = &input[read..];
                        }
                    }
                }
            }
        }
        self.stream.feed(&output);
    }
}
