use crate::{
    common::frame::Frame,
    config::Configuration,
    error::{AppError, IntakeError},
    intake::frame_source::FrameSource,
    pipeline::{AccuracyReport, FrameRecord, ReferenceCell, SteeringPipeline},
};
use tokio::sync::mpsc::{Receiver, Sender, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower::{Service, ServiceExt};

pub struct Coordinator {
    configuration: Configuration,
    frame_source: Box<dyn FrameSource>,
    pipeline: SteeringPipeline,
    record_sink: Option<UnboundedSender<FrameRecord>>,
    cancel_token: CancellationToken,
}

impl Coordinator {
    fn new(
        configuration: Configuration,
        frame_source: Box<dyn FrameSource>,
        reference: ReferenceCell,
        record_sink: Option<UnboundedSender<FrameRecord>>,
    ) -> Self {
        let pipeline = SteeringPipeline::new(&configuration, reference);
        Self {
            configuration,
            frame_source,
            pipeline,
            record_sink,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Cancelling the token stops the intake; frames already queued are still processed.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub async fn run(self) -> Result<AccuracyReport, AppError> {
        tracing::info!(
            "Starting run for '{}' from source '{}'",
            self.configuration.source_id,
            self.frame_source.name()
        );
        let (frame_tx, frame_rx) = tokio::sync::mpsc::channel(self.configuration.frame_buffer_size);
        let intake_task =
            Self::start_intake_task(self.frame_source, frame_tx, self.cancel_token.clone());
        let pipeline_task = Self::start_pipeline_task(self.pipeline, frame_rx, self.record_sink);

        let intake_result = intake_task
            .await
            .map_err(|e| AppError::Pipeline(format!("Intake task failed: {e}")))?;
        let pipeline = pipeline_task
            .await
            .map_err(|e| AppError::Pipeline(format!("Pipeline task failed: {e}")))?;

        // frames scored before an intake failure still count
        match intake_result {
            Ok(delivered) => tracing::info!(
                "Run finished: {} frames delivered, {} processed",
                delivered,
                pipeline.state().frames_processed()
            ),
            Err(e) => tracing::error!(
                "Intake stopped early after {} processed frames: {}",
                pipeline.state().frames_processed(),
                e
            ),
        }
        Ok(pipeline.report())
    }

    fn start_intake_task(
        mut frame_source: Box<dyn FrameSource>,
        frame_tx: Sender<Frame>,
        cancel_token: CancellationToken,
    ) -> JoinHandle<Result<u64, IntakeError>> {
        tokio::spawn(async move {
            let mut delivered = 0;
            loop {
                let next = tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Intake cancelled after {} frames", delivered);
                        break;
                    }
                    next = frame_source.next_frame() => next?,
                };
                let Some(frame) = next else {
                    tracing::info!(
                        "Source '{}' exhausted after {} frames",
                        frame_source.name(),
                        delivered
                    );
                    break;
                };
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Intake cancelled after {} frames", delivered);
                        break;
                    }
                    sent = frame_tx.send(frame) => sent.map_err(|_| IntakeError::ChannelClosed)?,
                }
                delivered += 1;
            }
            Ok(delivered)
        })
    }

    fn start_pipeline_task(
        mut pipeline: SteeringPipeline,
        mut frame_rx: Receiver<Frame>,
        record_sink: Option<UnboundedSender<FrameRecord>>,
    ) -> JoinHandle<SteeringPipeline> {
        tokio::spawn(async move {
            while let Some(frame) = frame_rx.recv().await {
                let response = match pipeline.ready().await {
                    Ok(service) => service.call(frame).await,
                    Err(e) => Err(e),
                };
                match response {
                    Ok(record) => match &record_sink {
                        Some(sink) => {
                            if sink.send(record).is_err() {
                                tracing::debug!("Record sink closed, dropping record");
                            }
                        }
                        None => println!("{record}"),
                    },
                    Err(e) => tracing::error!("Pipeline error: {}", e),
                }
            }
            pipeline
        })
    }
}

pub struct CoordinatorBuilder {
    configuration: Configuration,
    frame_source: Option<Box<dyn FrameSource>>,
    reference: ReferenceCell,
    record_sink: Option<UnboundedSender<FrameRecord>>,
}

impl CoordinatorBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            frame_source: None,
            reference: ReferenceCell::new(),
            record_sink: None,
        }
    }

    // Adjusts the frame buffer size, this will override the configuration.
    pub fn frame_buffer_size(mut self, frame_buffer_size: usize) -> Self {
        self.configuration.frame_buffer_size = frame_buffer_size;
        self
    }

    pub fn frame_source(mut self, frame_source: Box<dyn FrameSource>) -> Self {
        self.frame_source = Some(frame_source);
        self
    }

    // The cell the pipeline reads reference values from. Share it with whatever delivers them.
    pub fn reference(mut self, reference: ReferenceCell) -> Self {
        self.reference = reference;
        self
    }

    // Records go to stdout unless a sink is set.
    pub fn record_sink(mut self, record_sink: UnboundedSender<FrameRecord>) -> Self {
        self.record_sink = Some(record_sink);
        self
    }

    pub fn build(self) -> Result<Coordinator, AppError> {
        let frame_source = self
            .frame_source
            .ok_or(AppError::Pipeline("Frame source not set".to_string()))?;
        self.configuration.validate()?;
        Ok(Coordinator::new(
            self.configuration,
            frame_source,
            self.reference,
            self.record_sink,
        ))
    }
}
