//! High-level reader interface

use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{broadcast, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use uhfprime_core::constants::{DEFAULT_ADDRESS, DEFAULT_EVENT_CAPACITY};
use uhfprime_core::{Command, Frame, FrameDecoder, FrameTrace, LinkState, RawFrame, Session};
use uhfprime_transport::{BoxedReader, BoxedWriter, TcpTransport, Transport};
use uhfprime_types::{InventoryRequest, ReaderParameters, RelayAction, TagReport};

use crate::error::{Error, Result};
use crate::event::ReaderEvent;
use crate::waiter::WaiterRegistry;

/// Initial receive buffer size
const READ_BUFFER_SIZE: usize = 4096;

/// UHF Prime reader session
///
/// Owns one connection, one background receive task and the waiter registry
/// that matches replies to callers. All operations take `&self`; share the
/// reader behind an [`Arc`] to call it from several tasks at once.
///
/// Replies are matched by command code only. Operations on different
/// commands may be outstanding together; operations on the same command
/// complete in the order they were issued.
///
/// There is no built-in reply timeout. Wrap calls in
/// [`tokio::time::timeout`] (or drop the future any other way) to give up on
/// a request; its waiter is removed when the future is dropped.
///
/// # Examples
///
/// ```no_run
/// use uhfprime::{Reader, ReaderEvent, InventoryRequest};
///
/// #[tokio::main]
/// async fn main() -> uhfprime::Result<()> {
///     let reader = Reader::new("192.168.1.190", 2022);
///     let mut events = reader.subscribe();
///
///     reader.connect().await?;
///     reader.start_inventory(InventoryRequest::continuous()).await?;
///
///     while let Ok(event) = events.recv().await {
///         if let ReaderEvent::TagReported(tag) = event {
///             println!("{}", tag);
///         }
///     }
///
///     reader.disconnect().await;
///     Ok(())
/// }
/// ```
pub struct Reader {
    transport: Box<dyn Transport>,
    address: u8,
    shared: Arc<Shared>,
    /// Send gate; holds the write half while connected
    writer: Mutex<Option<BoxedWriter>>,
    /// Lifecycle gate; holds the receive task while connected
    receiver: Mutex<Option<ReceiveTask>>,
}

/// State shared with the receive task
struct Shared {
    session: Session,
    waiters: Arc<WaiterRegistry>,
    events: broadcast::Sender<ReaderEvent>,
}

struct ReceiveTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Shared {
    fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            session: Session::new(DEFAULT_ADDRESS),
            waiters: Arc::new(WaiterRegistry::new()),
            events,
        }
    }

    fn publish(&self, event: ReaderEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn trace_frame(&self, frame: FrameTrace) {
        trace!("{}", frame);
        self.publish(ReaderEvent::FrameTraced(frame));
    }
}

impl Reader {
    /// Create a reader reached over TCP
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::with_transport(TcpTransport::new(host, port))
    }

    /// Create a reader over a custom transport
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            address: DEFAULT_ADDRESS,
            shared: Arc::new(Shared::new(DEFAULT_EVENT_CAPACITY)),
            writer: Mutex::new(None),
            receiver: Mutex::new(None),
        }
    }

    /// Set the reader address stamped on outgoing frames (default: 0xFF)
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the event channel capacity (default: 256, minimum: 1)
    ///
    /// Call before [`Reader::subscribe`]; earlier receivers are detached.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.shared = Arc::new(Shared::new(capacity.max(1)));
        self
    }

    /// Subscribe to tag, frame and trace notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ReaderEvent> {
        self.shared.events.subscribe()
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.shared.session.is_connected()
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.shared.session.state()
    }

    /// Address used on outgoing frames
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Get remote address
    pub fn remote_addr(&self) -> String {
        self.transport.remote_addr()
    }

    /// Number of requests waiting for a reply
    pub fn pending_requests(&self) -> usize {
        self.shared.waiters.pending()
    }

    /// Connect to the reader
    ///
    /// An existing connection is torn down first.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the socket cannot be opened; the reader
    /// stays disconnected.
    pub async fn connect(&self) -> Result<()> {
        let mut receiver = self.receiver.lock().await;
        self.teardown(&mut receiver).await;

        info!("Connecting to {}...", self.transport.remote_addr());

        self.shared.session.begin_connect(self.address)?;

        let conn = match self.transport.open().await {
            Ok(conn) => conn,
            Err(e) => {
                self.shared.session.close();
                warn!("Failed to connect to {}: {}", self.transport.remote_addr(), e);
                return Err(e.into());
            }
        };

        *self.writer.lock().await = Some(conn.writer);
        self.shared.session.mark_connected()?;

        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(Self::receive_loop(
            conn.reader,
            shutdown_rx,
            Arc::clone(&self.shared),
        ));
        *receiver = Some(ReceiveTask { shutdown, handle });

        info!("Connected to {} (address=0x{:02X})", conn.peer, self.address);

        Ok(())
    }

    /// Disconnect from the reader
    ///
    /// Stops the receive loop, closes the socket and cancels every pending
    /// request. Safe to call repeatedly.
    pub async fn disconnect(&self) {
        let mut receiver = self.receiver.lock().await;
        self.teardown(&mut receiver).await;
    }

    /// Read the complete reader configuration
    pub async fn get_all_parameters(&self) -> Result<ReaderParameters> {
        debug!("Getting all parameters...");

        let frame = self.request(Command::GetAllParameters, &[]).await?;

        match ReaderParameters::from_payload(&frame.payload) {
            Ok(params) => {
                debug!("Parameters: {}", params);
                Ok(params)
            }
            Err(_) if !frame.is_success() => Err(Error::Status {
                command: Command::GetAllParameters,
                status: frame.status,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the complete reader configuration
    pub async fn set_all_parameters(&self, params: &ReaderParameters) -> Result<()> {
        debug!("Setting all parameters: {}", params);

        let frame = self
            .request(Command::SetAllParameters, &params.to_payload())
            .await?;
        Self::expect_success(Command::SetAllParameters, frame)?;

        Ok(())
    }

    /// Start an inventory round
    ///
    /// Tags are published as [`ReaderEvent::TagReported`]; the call returns
    /// once the request is on the wire.
    pub async fn start_inventory(&self, request: InventoryRequest) -> Result<()> {
        debug!(
            "Starting inventory (mode=0x{:02X}, parameter={})",
            request.mode, request.parameter
        );

        self.send_command(Command::InventoryIsoContinue, &request.to_payload())
            .await
    }

    /// Stop a running inventory
    pub async fn stop_inventory(&self) -> Result<()> {
        debug!("Stopping inventory...");

        let frame = self.request(Command::InventoryStop, &[]).await?;
        Self::expect_success(Command::InventoryStop, frame)?;

        Ok(())
    }

    /// Drive the relay contact
    pub async fn pulse_relay(&self, action: RelayAction) -> Result<()> {
        debug!("Relay {:?}...", action);

        let frame = self
            .request(Command::RelayControl, &action.to_payload())
            .await?;
        Self::expect_success(Command::RelayControl, frame)?;

        Ok(())
    }

    /// Send a command and wait for the reply frame
    ///
    /// The reply status is not checked.
    pub async fn request(&self, command: Command, payload: &[u8]) -> Result<Frame> {
        // Register before sending so a fast reply cannot be missed
        let pending = self.shared.waiters.register(command.into());
        self.send_command(command, payload).await?;
        pending.wait().await
    }

    /// Send a command without waiting for a reply
    ///
    /// Dropping the future while the frame is being written can leave a
    /// partial frame on the wire, which the device has to skip up to the
    /// next frame head.
    pub async fn send_command(&self, command: Command, payload: &[u8]) -> Result<()> {
        let address = self.shared.session.address();
        let frame = Frame::encode(address, command, payload)?;

        let mut gate = self.writer.lock().await;
        let writer = match gate.as_mut() {
            Some(writer) if self.shared.session.is_connected() => writer,
            _ => return Err(Error::NotConnected),
        };

        let frame = frame.freeze();
        self.shared.trace_frame(FrameTrace::outbound(
            frame.clone(),
            address,
            command.into(),
            payload.len(),
        ));

        let written = match writer.write_all(&frame).await {
            Ok(()) => writer.flush().await,
            Err(e) => Err(e),
        };
        drop(gate);

        if let Err(e) = written {
            warn!("Failed to send {}: {}", command, e);
            self.disconnect().await;
            return Err(uhfprime_transport::Error::Io(e).into());
        }

        Ok(())
    }

    // Helper methods

    fn expect_success(command: Command, frame: Frame) -> Result<Frame> {
        if frame.is_success() {
            Ok(frame)
        } else {
            Err(Error::Status {
                command,
                status: frame.status,
            })
        }
    }

    /// Stop the receive loop and drop the link
    ///
    /// The link is marked down and waiters are cancelled before the first
    /// await, so a caller dropped mid-teardown still leaves the reader
    /// disconnected.
    async fn teardown(&self, receiver: &mut Option<ReceiveTask>) {
        let handle = receiver.take().map(|task| {
            debug!("Stopping receive loop...");
            let _ = task.shutdown.send(());
            task.handle
        });
        let cancelled = self.shared.waiters.cancel_all();
        self.shared.session.close();

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Receive loop ended abnormally: {}", e);
            }

            info!(
                "Disconnected from {} ({} pending requests cancelled)",
                self.transport.remote_addr(),
                cancelled
            );
        }

        if let Some(mut writer) = self.writer.lock().await.take() {
            // Graceful shutdown
            let _ = writer.shutdown().await;
        }
    }

    /// Background receive loop
    ///
    /// Exits on shutdown, end of stream or I/O error. When the link drops on
    /// its own, every waiter is cancelled and the session marked down.
    async fn receive_loop(
        mut reader: BoxedReader,
        mut shutdown: oneshot::Receiver<()>,
        shared: Arc<Shared>,
    ) {
        let mut decoder = FrameDecoder::new();
        let mut buf = BytesMut::with_capacity(READ_BUFFER_SIZE);

        let lost = loop {
            while let Some(raw) = decoder.decode(&mut buf) {
                Self::dispatch_frame(&shared, raw);
            }

            tokio::select! {
                _ = &mut shutdown => break None,
                read = reader.read_buf(&mut buf) => match read {
                    Ok(0) => break Some("connection closed by reader".to_string()),
                    Ok(n) => trace!("Received {} bytes", n),
                    Err(e) => break Some(format!("read failed: {}", e)),
                },
            }
        };

        if let Some(reason) = lost {
            let cancelled = shared.waiters.cancel_all();
            shared.session.close();
            warn!(
                "Receive loop stopped, {} ({} pending requests cancelled)",
                reason, cancelled
            );
        } else {
            debug!(
                "Receive loop stopped ({} stray bytes skipped)",
                decoder.discarded()
            );
        }
    }

    /// Route one inbound frame
    fn dispatch_frame(shared: &Shared, raw: RawFrame) {
        shared.trace_frame(raw.trace());

        let frame = match raw.validate() {
            Ok(frame) => frame,
            Err(e) => {
                debug!("Dropping frame: {}", e);
                return;
            }
        };

        shared.publish(ReaderEvent::FrameReceived(frame.clone()));

        if let Err(frame) = shared.waiters.resolve(frame) {
            Self::dispatch_unsolicited(shared, frame);
        }
    }

    fn dispatch_unsolicited(shared: &Shared, frame: Frame) {
        if !frame.command_kind().is_some_and(Command::is_streaming) {
            debug!("Ignoring unsolicited frame {}", frame);
            return;
        }

        if !frame.is_success() {
            debug!("Inventory reply with status 0x{:02X}", frame.status);
            return;
        }

        match TagReport::parse_inventory_payload(&frame.payload) {
            Ok(report) => {
                trace!("Tag reported: {}", report);
                shared.publish(ReaderEvent::TagReported(report));
            }
            Err(e) => warn!(
                "Failed to parse INVENTORY payload LEN={} HEX={}: {}",
                frame.payload.len(),
                hex::encode_upper(&frame.payload),
                e
            ),
        }
    }
}

impl Drop for Reader {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("Reader dropped while still connected");
        }
    }
}
