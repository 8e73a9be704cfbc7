//! Route: Diagnostics gRPC handler.

use std::pin::Pin;

use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};
use tracing::{debug, info, trace};

use crate::diagnostics::map;
use crate::runtime::blocking::run_blocking;
use crate::state::SharedState;

use crate::proto::{
    diagnostics_server::Diagnostics, SearchLogRequest, SearchLogResponse, ServerInfoRequest, ServerInfoResponse,
};

pub struct DiagnosticsServiceImpl {
    state: SharedState,
}

impl DiagnosticsServiceImpl {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }
}

#[tonic::async_trait]
impl Diagnostics for DiagnosticsServiceImpl {
    type SearchLogStream = Pin<Box<dyn Stream<Item = Result<SearchLogResponse, Status>> + Send>>;

    async fn search_log(
        &self,
        request: Request<SearchLogRequest>,
    ) -> Result<Response<Self::SearchLogStream>, Status> {
        let req = map::convert_search_request(request.into_inner())?;
        info!(
            start_time = req.start_time,
            end_time = req.end_time,
            levels = req.levels.len(),
            patterns = req.patterns.len(),
            "SearchLog"
        );

        let searcher = self.state.searcher();
        let batch_size = searcher.batch_size();

        // Cancelled when the response stream is dropped, i.e. when the
        // client goes away.
        let cancel = CancellationToken::new();
        let guard = cancel.clone().drop_guard();

        let open_token = cancel.clone();
        let iter = run_blocking(move || searcher.open(req, &open_token))
            .await
            .map_err(map::panic_status)?
            .map_err(|e| map::search_error_status(&e))?;

        let response_stream = async_stream::stream! {
            let _guard = guard;
            let mut iter = iter;
            let mut sent = 0usize;

            loop {
                let token = cancel.clone();
                let pulled = run_blocking(move || {
                    let batch = iter.next_batch(&token, batch_size);
                    (iter, batch)
                })
                .await;

                let (returned, batch) = match pulled {
                    Ok(pulled) => pulled,
                    Err(panicked) => {
                        yield Err(map::panic_status(panicked));
                        break;
                    }
                };
                iter = returned;

                match batch {
                    Ok(batch) => {
                        let drained = batch.drained;
                        sent += batch.records.len();
                        trace!(records = batch.records.len(), "Sending batch");
                        yield Ok(map::convert_batch(batch.records));
                        if drained {
                            let (scanned, matched, bytes) = iter.filter().stats();
                            debug!(sent, scanned, matched, bytes, "SearchLog finished");
                            break;
                        }
                    }
                    Err(e) => {
                        yield Err(map::search_error_status(&e));
                        break;
                    }
                }
            }
        };

        Ok(Response::new(Box::pin(response_stream)))
    }

    async fn server_info(
        &self,
        request: Request<ServerInfoRequest>,
    ) -> Result<Response<ServerInfoResponse>, Status> {
        let kind = map::convert_info_type(request.into_inner().tp)?;
        info!(?kind, "ServerInfo");

        let items = run_blocking(move || crate::info::collect(kind))
            .await
            .map_err(map::panic_status)?;
        Ok(Response::new(map::convert_info_items(items)))
    }
}
