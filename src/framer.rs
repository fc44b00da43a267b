//! # Stream Framer
//!
//! Cuts an arbitrarily chunked byte stream into candidate sentences, each running
//! from a `$` up to and including the next `\n`. Bytes outside a frame are
//! discarded. Frames are emitted the same way whatever the chunk boundaries.
//!
//! A line longer than the pending limit is dropped as a whole, up to its `\n`,
//! whether it arrives in one chunk or many.

/// Where the framer stands in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Skipping bytes until a `$`.
    SeekingStart,
    /// Inside a frame, collecting bytes until a `\n`.
    SeekingEnd,
    /// Skipping the rest of an overlong line up to its `\n`.
    Discarding,
}

#[derive(Debug, Clone)]
pub struct Framer {
    state: FrameState,
    pending: Vec<u8>,
    max_pending: usize,
    overflows: u64,
}

impl Framer {
    /// Creates a framer that drops any frame longer than `max_pending` bytes.
    pub fn new(max_pending: usize) -> Self {
        Self {
            state: FrameState::SeekingStart,
            pending: Vec::new(),
            max_pending,
            overflows: 0,
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Bytes of the incomplete frame carried over to the next chunk.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Number of frames abandoned for exceeding the pending limit.
    pub fn overflows(&self) -> u64 {
        self.overflows
    }

    /// Consumes `chunk`, calling `on_frame` for every complete frame.
    ///
    /// Returns the number of frames emitted.
    pub fn push(&mut self, mut chunk: &[u8], mut on_frame: impl FnMut(&[u8])) -> usize {
        let mut frames = 0;

        while !chunk.is_empty() {
            match self.state {
                FrameState::SeekingStart => {
                    let Some(start) = chunk.iter().position(|&b| b == b'$') else {
                        return frames;
                    };
                    chunk = &chunk[start..];
                    self.state = FrameState::SeekingEnd;
                }
                FrameState::SeekingEnd => {
                    let Some(end) = chunk.iter().position(|&b| b == b'\n') else {
                        self.pending.extend_from_slice(chunk);
                        if self.pending.len() > self.max_pending {
                            self.overflow(self.pending.len());
                            self.state = FrameState::Discarding;
                        }
                        return frames;
                    };

                    let (frame, rest) = chunk.split_at(end + 1);
                    chunk = rest;
                    self.state = FrameState::SeekingStart;

                    let len = self.pending.len() + frame.len();
                    if len > self.max_pending {
                        self.overflow(len);
                        continue;
                    }

                    if self.pending.is_empty() {
                        on_frame(frame);
                    } else {
                        self.pending.extend_from_slice(frame);
                        on_frame(&self.pending);
                        self.pending.clear();
                    }
                    frames += 1;
                }
                FrameState::Discarding => {
                    let Some(end) = chunk.iter().position(|&b| b == b'\n') else {
                        return frames;
                    };
                    chunk = &chunk[end + 1..];
                    self.state = FrameState::SeekingStart;
                }
            }
        }

        frames
    }

    /// Drops the frame in progress and resynchronises on the next `$`.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.state = FrameState::SeekingStart;
    }

    fn overflow(&mut self, len: usize) {
        log::warn!(
            "dropping {len}+ byte sentence, longer than the {} byte limit",
            self.max_pending
        );
        self.overflows += 1;
        self.pending.clear();
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new(crate::config::SessionConfig::default().max_pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &[u8] = b"noise$GPGGA,1*00\r\n\r\n$GPGSA,2*00\r\n$GPRMC,3*00\r\n";

    fn frames(framer: &mut Framer, chunks: &[&[u8]]) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        for chunk in chunks {
            framer.push(chunk, |frame| out.push(frame.to_vec()));
        }
        out
    }

    #[test]
    fn test_whole_stream() {
        let mut framer = Framer::default();
        let out = frames(&mut framer, &[STREAM]);
        assert_eq!(
            out,
            vec![
                b"$GPGGA,1*00\r\n".to_vec(),
                b"$GPGSA,2*00\r\n".to_vec(),
                b"$GPRMC,3*00\r\n".to_vec(),
            ]
        );
        assert_eq!(framer.state(), FrameState::SeekingStart);
        assert!(framer.pending().is_empty());
    }

    #[test]
    fn test_chunk_boundaries_do_not_matter() {
        let expected = frames(&mut Framer::default(), &[STREAM]);

        for size in 1..STREAM.len() {
            let chunks: Vec<&[u8]> = STREAM.chunks(size).collect();
            assert_eq!(frames(&mut Framer::default(), &chunks), expected, "size {size}");
        }

        let byte_by_byte: Vec<&[u8]> = STREAM.chunks(1).collect();
        let mut framer = Framer::default();
        assert_eq!(frames(&mut framer, &byte_by_byte).len(), 3);
    }

    #[test]
    fn test_partial_frame_is_kept() {
        let mut framer = Framer::default();
        assert_eq!(framer.push(b"xx$GPGGA,1", |_| {}), 0);
        assert_eq!(framer.state(), FrameState::SeekingEnd);
        assert_eq!(framer.pending(), b"$GPGGA,1");

        let out = frames(&mut framer, &[b"*00\r", b"\n"]);
        assert_eq!(out, vec![b"$GPGGA,1*00\r\n".to_vec()]);

        framer.push(b"$GPGSA,2", |_| {});
        framer.reset();
        assert!(framer.pending().is_empty());
        assert_eq!(framer.push(b"*00\r\n", |_| panic!("no frame expected")), 0);
    }

    #[test]
    fn test_empty_chunk() {
        let mut framer = Framer::default();
        assert_eq!(framer.push(b"", |_| panic!("no frame expected")), 0);
        assert_eq!(framer.state(), FrameState::SeekingStart);
    }

    #[test]
    fn test_dollar_inside_frame() {
        // A second `$` does not restart the frame; the validator rejects the result.
        let mut framer = Framer::default();
        let out = frames(&mut framer, &[b"$GPG$GPGGA,1\r\n"]);
        assert_eq!(out, vec![b"$GPG$GPGGA,1\r\n".to_vec()]);
    }

    #[test]
    fn test_pending_overflow_resyncs() {
        let mut framer = Framer::new(16);
        framer.push(b"$GPTXT,0123456789", |_| panic!("no frame expected"));
        assert_eq!(framer.state(), FrameState::Discarding);
        assert!(framer.pending().is_empty());
        assert_eq!(framer.overflows(), 1);

        // The rest of the overlong line is skipped, `$` included.
        let out = frames(&mut framer, &[b"AB$CD\r\n$GPGGA,1\r\n"]);
        assert_eq!(out, vec![b"$GPGGA,1\r\n".to_vec()]);
        assert_eq!(framer.overflows(), 1);
    }

    #[test]
    fn test_complete_overlong_frame_is_dropped() {
        let mut framer = Framer::new(16);
        let out = frames(&mut framer, &[b"$GPTXT,0123456789\r\n$GPGGA,1\r\n"]);
        assert_eq!(out, vec![b"$GPGGA,1\r\n".to_vec()]);
        assert_eq!(framer.overflows(), 1);
    }

    #[test]
    fn test_overlong_line_split_anywhere() {
        let line: &[u8] = b"$GPTXT,AAAAAAAAAAAA$GPGGA,1\r\n$GPGSA,2\r\n";
        let mut whole = Framer::new(16);
        let expected = frames(&mut whole, &[line]);
        assert_eq!(expected, vec![b"$GPGSA,2\r\n".to_vec()]);

        for at in 1..line.len() {
            let mut framer = Framer::new(16);
            let (head, tail) = line.split_at(at);
            assert_eq!(frames(&mut framer, &[head, tail]), expected, "split at {at}");
            assert_eq!(framer.overflows(), 1, "split at {at}");
        }
    }
}
