use std::future::Future;
use std::io::Result as IoResult;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

use crate::block::Block;
use crate::internal_client_in::MAX_COMPRESSION_SIZE;
use crate::io::ChNativeRead;
use crate::protocol::{CompressionMethod, MAX_STRING_SIZE};
use crate::{ChNativeError, Result};

pub async fn compress_block(block: Block, revision: u64) -> Result<(Vec<u8>, usize)> {
    let mut raw = vec![];
    block.write(&mut raw, revision).await?;
    // print!("raw block out: ");
    // for b in &raw {
    //     print!("{b:02X}");
    // }
    // println!();
    let raw_len = raw.len();
    let mut compressed = Vec::<u8>::with_capacity(raw.len() + (raw.len() / 255) + 16 + 1);
    let out_len = unsafe {
        lz4::liblz4::LZ4_compress_default(
            raw.as_ptr() as *const i8,
            compressed.as_mut_ptr() as *mut i8,
            raw.len() as i32,
            compressed.capacity() as i32,
        )
    };
    if out_len <= 0 {
        return Err(ChNativeError::ProtocolError(
            "invalid compression state".to_string(),
        ));
    }
    if out_len as usize > compressed.capacity() {
        panic!("buffer overflow in compress_block?");
    }
    unsafe { compressed.set_len(out_len as usize) };

    Ok((compressed, raw_len))
}

pub async fn decompress_block(data: &[u8], decompressed_size: u32, revision: u64) -> Result<Block> {
    let mut output = Vec::with_capacity(decompressed_size as usize + 1);

    let out_len = unsafe {
        lz4::liblz4::LZ4_decompress_safe(
            data.as_ptr() as *const i8,
            output.as_mut_ptr() as *mut i8,
            data.len() as i32,
            output.capacity() as i32,
        )
    };
    if out_len < 0 {
        return Err(ChNativeError::ProtocolError(
            "malformed compressed block".to_string(),
        ));
    }
    if out_len as usize > output.capacity() {
        panic!("buffer overflow in decompress_block?");
    }
    unsafe { output.set_len(out_len as usize) };

    let block = Block::read(&mut &output[..], revision).await?;

    Ok(block)
}

/// Pulls one compressed frame off the wire: 16-byte CityHash128 checksum, 9-byte header
/// (method byte, compressed size including the header, decompressed size), then the
/// compressed payload. Returns the decompressed bytes.
async fn read_frame<R: ChNativeRead>(reader: &mut R, expected_method: u8) -> Result<Vec<u8>> {
    let mut checksum = [0u8; 16];
    reader.read_exact(&mut checksum[..]).await?;

    let mut header = [0u8; 9];
    reader.read_exact(&mut header[..]).await?;

    let method = header[0];
    if method != expected_method {
        return Err(ChNativeError::ProtocolError(format!(
            "unknown compression method byte: {method:#x}"
        )));
    }

    let compressed_size = u32::from_le_bytes(header[1..5].try_into().unwrap());
    let decompressed_size = u32::from_le_bytes(header[5..9].try_into().unwrap());
    if compressed_size < 9 || compressed_size > MAX_COMPRESSION_SIZE {
        return Err(ChNativeError::ProtocolError(format!(
            "invalid compressed block size: {compressed_size}"
        )));
    }
    if decompressed_size as usize > MAX_STRING_SIZE {
        return Err(ChNativeError::ProtocolError(format!(
            "invalid decompressed block size: {decompressed_size}"
        )));
    }

    let payload_len = compressed_size as usize - 9;
    let mut payload = vec![0u8; payload_len];
    reader.read_exact(&mut payload[..]).await?;

    let high = u64::from_le_bytes(checksum[0..8].try_into().unwrap());
    let low = u64::from_le_bytes(checksum[8..16].try_into().unwrap());
    let expected_hash = (u128::from(high) << 64) | u128::from(low);

    let mut hashed = Vec::with_capacity(header.len() + payload.len());
    hashed.extend_from_slice(&header[..]);
    hashed.extend_from_slice(&payload[..]);
    let actual_hash = cityhash_rs::cityhash_102_128(&hashed[..]);
    if actual_hash != expected_hash {
        return Err(ChNativeError::ProtocolError(
            "checksum mismatch in compressed block".to_string(),
        ));
    }

    let mut output = Vec::with_capacity(decompressed_size as usize);
    let out_len = unsafe {
        lz4::liblz4::LZ4_decompress_safe(
            payload.as_ptr() as *const i8,
            output.as_mut_ptr() as *mut i8,
            payload.len() as i32,
            output.capacity() as i32,
        )
    };
    if out_len < 0 {
        return Err(ChNativeError::ProtocolError(
            "malformed compressed block".to_string(),
        ));
    }
    if out_len as usize > output.capacity() {
        panic!("buffer overflow in decompress_block?");
    }
    unsafe { output.set_len(out_len as usize) };

    Ok(output)
}

type PendingFrame<R> = Pin<Box<dyn Future<Output = (R, Result<Vec<u8>>)> + Send + Sync>>;

/// Wraps an underlying reader and transparently decompresses the stream of independently
/// compressed frames it carries, presenting a single continuous byte stream to callers.
/// The decode buffer grows to fit each frame but is never shrunk between frames.
///
/// Owns the underlying reader outright rather than borrowing it, so that it can satisfy
/// [`ChNativeRead`] through the blanket impl in [`crate::io`] instead of a manual one.
pub struct DecompressionReader<R: ChNativeRead + 'static> {
    reader: Option<R>,
    method: u8,
    buffer: Vec<u8>,
    position: usize,
    pending: Option<PendingFrame<R>>,
}

impl<R: ChNativeRead + 'static> DecompressionReader<R> {
    pub fn new(compression: CompressionMethod, reader: R) -> Self {
        DecompressionReader {
            reader: Some(reader),
            method: compression.byte(),
            buffer: Vec::new(),
            position: 0,
            pending: None,
        }
    }

    /// Hands the underlying reader back. Only valid once no read is in flight, which holds
    /// after any `poll_read` has returned `Ready`.
    pub fn into_inner(self) -> R {
        self.reader
            .expect("DecompressionReader::into_inner called with a read in flight")
    }
}

impl<R: ChNativeRead + 'static> AsyncRead for DecompressionReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<IoResult<()>> {
        loop {
            if self.position < self.buffer.len() {
                let available = &self.buffer[self.position..];
                let n = available.len().min(buf.remaining());
                buf.put_slice(&available[..n]);
                self.position += n;
                return Poll::Ready(Ok(()));
            }

            if self.pending.is_none() {
                let reader = self
                    .reader
                    .take()
                    .expect("DecompressionReader polled after an in-flight read completed in error");
                let method = self.method;
                let fut: PendingFrame<R> = Box::pin(async move {
                    let mut reader = reader;
                    let result = read_frame(&mut reader, method).await;
                    (reader, result)
                });
                self.pending = Some(fut);
            }

            let pending = self.pending.as_mut().unwrap();
            match pending.as_mut().poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready((reader, result)) => {
                    self.pending = None;
                    self.reader = Some(reader);
                    match result {
                        Ok(data) => {
                            self.buffer = data;
                            self.position = 0;
                        }
                        Err(e) => {
                            return Poll::Ready(Err(std::io::Error::new(
                                std::io::ErrorKind::Other,
                                e,
                            )))
                        }
                    }
                }
            }
        }
    }
}
