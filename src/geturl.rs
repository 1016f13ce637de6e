use crate::factory::AsyncWriterFactory;
use anyhow::Error;
use futures_util::stream::StreamExt;
use tokio::io::{copy, AsyncWriteExt};
use tokio_util::io::StreamReader;

/// A result from a possibly-retriable operation.
pub(crate) enum RetriableResult<R, E> {
    /// Operation failed, but could be retried
    Retriable(E),
    /// Operation failed, and should not be retried
    Permanent(E),
    /// Operation succeeded
    Ok(R),
}

/// GET a URL and stream its body into a fresh writer from the factory.  Returns the number of
/// bytes written; the return value also indicates whether a failure can be retried.
pub(crate) async fn get_url<AWF: AsyncWriterFactory>(
    client: &reqwest::Client,
    url: &str,
    writer_factory: &mut AWF,
) -> RetriableResult<u64, Error> {
    let res = match client
        .get(url)
        .send()
        .await
        .and_then(|res| res.error_for_status())
    {
        Err(err) => {
            // a client error (e.g., 404) will not go away by asking again
            if err.status().map(|s| s.is_client_error()).unwrap_or(false) {
                return RetriableResult::Permanent(err.into());
            } else {
                return RetriableResult::Retriable(err.into());
            }
        }

        Ok(res) => res,
    };

    let stream = res
        .bytes_stream()
        .map(|r| r.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)));
    let mut reader = StreamReader::new(stream);

    let mut writer = match writer_factory.get_writer().await {
        Ok(w) => w,
        // failing to open the destination is local, and not retriable
        Err(e) => return RetriableResult::Permanent(e),
    };

    let written = match copy(&mut reader, &mut writer).await {
        Ok(n) => n,
        // a connection dropped mid-body is common and retriable
        Err(e) => return RetriableResult::Retriable(e.into()),
    };

    if let Err(e) = writer.shutdown().await {
        return RetriableResult::Permanent(e.into());
    }

    RetriableResult::Ok(written)
}
