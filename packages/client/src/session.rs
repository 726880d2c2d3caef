//! Client session: relay between the terminal and the server.

use std::time::Duration;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    sync::mpsc,
};

use crate::error::ClientError;

/// How long to wait for the server to close after local input ends
const CLOSE_GRACE_PERIOD: Duration = Duration::from_secs(1);

/// Connect to `address` and relay until either side ends the session.
pub async fn run_client(address: &str) -> Result<(), ClientError> {
    let stream = TcpStream::connect(address)
        .await
        .map_err(|source| ClientError::Connection {
            address: address.to_string(),
            source,
        })?;
    tracing::info!("Connected to chat server at {}", address);

    let (reader, writer) = stream.into_split();

    // Spawn a task to print everything the server sends
    let mut read_task = tokio::spawn(pump_output(reader, tokio::io::stdout()));

    // Spawn a blocking thread for rustyline (synchronous readline)
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || read_input(input_tx));

    // Spawn a task to send typed lines to the server
    let mut write_task = tokio::spawn(forward_input(input_rx, writer));

    tokio::select! {
        _ = &mut read_task => {
            tracing::info!("Server closed the connection");
            write_task.abort();
        }
        result = &mut write_task => {
            match result {
                Ok(Ok(())) => tracing::debug!("Input closed, waiting for server to hang up"),
                Ok(Err(e)) => tracing::warn!("Failed to send to server: {}", e),
                Err(e) => tracing::warn!("Write task failed: {}", e),
            }
            if tokio::time::timeout(CLOSE_GRACE_PERIOD, read_task).await.is_err() {
                tracing::debug!("Server did not close the connection in time");
            }
        }
    }

    Ok(())
}

/// Copy server bytes to `out` until the server closes the stream.
///
/// Returns the number of bytes relayed.
pub async fn pump_output<R, W>(mut reader: R, mut out: W) -> u64
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = [0u8; 1024];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("Read error: {}", e);
                break;
            }
        };
        if let Err(e) = async {
            out.write_all(&buf[..n]).await?;
            out.flush().await
        }
        .await
        {
            tracing::warn!("Failed to write output: {}", e);
            break;
        }
        total += n as u64;
    }
    total
}

/// Send every input line, newline terminated, then half-close the stream.
pub async fn forward_input<W>(
    mut input: mpsc::UnboundedReceiver<String>,
    mut writer: W,
) -> Result<(), ClientError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = input.recv().await {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    writer.shutdown().await?;
    Ok(())
}

fn read_input(input_tx: mpsc::UnboundedSender<String>) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to initialize readline: {}", e);
            return;
        }
    };

    loop {
        match rl.readline("") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    rl.add_history_entry(line.as_str()).ok();
                }
                if input_tx.send(line).is_err() {
                    // Channel closed, exit thread
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                tracing::info!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                tracing::info!("EOF");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {}", err);
                break;
            }
        }
    }
}
