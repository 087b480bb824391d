//! Streaming HTTP GET
//!
//! One plain-HTTP request at a time; the body is handed to the caller in
//! chunks as it arrives so the JSON decoders never need the whole
//! document. The entire request is bounded by one overall timeout.

use defmt::*;
use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration, TimeoutError};
use embedded_io_async::Read;
use reqwless::client::HttpClient;
use reqwless::request::Method;

use abfahrt_core::power::HTTP_TIMEOUT_MS;

/// Fetch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    /// Overall timeout elapsed
    Timeout,
    /// Connect, DNS, or protocol failure
    Connection,
    /// Non-200 response status
    Status(u16),
    /// The chunk consumer rejected the body
    Decode,
}

const RX_BUF_SIZE: usize = 4096;

/// GET `url` and stream the response body through `on_chunk`
///
/// `on_chunk` returns false to abort the transfer (decoder error); bytes
/// already consumed stay consumed.
pub async fn get_streamed(
    stack: Stack<'_>,
    url: &str,
    mut on_chunk: impl FnMut(&[u8]) -> bool,
) -> Result<(), FetchError> {
    let result = with_timeout(Duration::from_millis(HTTP_TIMEOUT_MS), async {
        let state = TcpClientState::<1, RX_BUF_SIZE, RX_BUF_SIZE>::new();
        let tcp = TcpClient::new(stack, &state);
        let dns = DnsSocket::new(stack);
        let mut client = HttpClient::new(&tcp, &dns);

        let mut request = client
            .request(Method::GET, url)
            .await
            .map_err(|_| FetchError::Connection)?;
        let mut rx_buf = [0u8; RX_BUF_SIZE];
        let response = request
            .send(&mut rx_buf)
            .await
            .map_err(|_| FetchError::Connection)?;

        if !response.status.is_successful() {
            return Err(FetchError::Status(response.status.0));
        }

        let mut reader = response.body().reader();
        let mut chunk = [0u8; 256];
        loop {
            let n = reader
                .read(&mut chunk)
                .await
                .map_err(|_| FetchError::Connection)?;
            if n == 0 {
                return Ok(());
            }
            if !on_chunk(&chunk[..n]) {
                return Err(FetchError::Decode);
            }
        }
    })
    .await;

    match result {
        Ok(inner) => inner,
        Err(TimeoutError) => {
            warn!("http fetch timed out");
            Err(FetchError::Timeout)
        }
    }
}
