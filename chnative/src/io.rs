use std::io::Result as IoResult;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{protocol::MAX_STRING_SIZE, ChNativeError, Result};

/// Binary codec reader half: fixed-width integers are plain `std::io::Result` (short reads
/// surface as the distinct `Io` error kind via `?`); length-prefixed reads additionally
/// validate against `MAX_STRING_SIZE` and so return the crate-wide [`Result`].
#[async_trait::async_trait]
pub trait ChNativeRead: AsyncRead + Unpin + Send + Sync {
    async fn read_var_uint(&mut self) -> IoResult<u64>;

    async fn read_string(&mut self) -> Result<String>;

    async fn read_binary(&mut self) -> Result<Vec<u8>>;
}

#[async_trait::async_trait]
impl<T: AsyncRead + Unpin + Send + Sync + 'static> ChNativeRead for T {
    async fn read_var_uint(&mut self) -> IoResult<u64> {
        let mut out = 0u64;
        for i in 0..9u64 {
            let mut octet = [0u8];
            self.read_exact(&mut octet[..]).await?;
            out |= ((octet[0] & 0x7F) as u64) << (7 * i);
            if (octet[0] & 0x80) == 0 {
                break;
            }
        }
        Ok(out)
    }

    async fn read_string(&mut self) -> Result<String> {
        let len = self.read_var_uint().await?;
        if len as usize > MAX_STRING_SIZE {
            return Err(ChNativeError::ProtocolError(
                "string too large".to_string(),
            ));
        }
        let mut buf = Vec::with_capacity(len as usize);
        unsafe { buf.set_len(len as usize) };

        self.read_exact(&mut buf[..]).await?;

        Ok(String::from_utf8(buf)?)
    }

    async fn read_binary(&mut self) -> Result<Vec<u8>> {
        let len = self.read_var_uint().await?;
        if len as usize > MAX_STRING_SIZE {
            return Err(ChNativeError::ProtocolError(
                "binary too large".to_string(),
            ));
        }
        let mut buf = Vec::with_capacity(len as usize);
        unsafe { buf.set_len(len as usize) };

        self.read_exact(&mut buf[..]).await?;

        Ok(buf)
    }
}

#[async_trait::async_trait]
pub trait ChNativeWrite: AsyncWrite + Unpin + Send + Sync + 'static {
    async fn write_var_uint(&mut self, value: u64) -> IoResult<()>;

    async fn write_string(&mut self, value: &str) -> IoResult<()>;
}

#[async_trait::async_trait]
impl<T: AsyncWrite + Unpin + Send + Sync + 'static> ChNativeWrite for T {
    async fn write_var_uint(&mut self, mut value: u64) -> IoResult<()> {
        for _ in 0..9u64 {
            let mut byte = value & 0x7F;
            if value > 0x7F {
                byte |= 0x80;
            }
            self.write_all(&[byte as u8]).await?;
            value >>= 7;
            if value == 0 {
                break;
            }
        }
        Ok(())
    }

    async fn write_string(&mut self, value: &str) -> IoResult<()> {
        self.write_var_uint(value.len() as u64).await?;
        self.write_all(value.as_bytes()).await?;
        Ok(())
    }
}