use crate::gateway::IqProGateway;

#[derive(Debug, Clone, axum::extract::FromRef)]
pub struct AppState {
    pub gate: IqProGateway,
}

impl AppState {
    pub fn new(gate: IqProGateway) -> Self {
        Self { gate }
    }
}
