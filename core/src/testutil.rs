use crate::passphrase::PASSCOMMAND_ENV;
use crate::runner::{CommandOutput, CommandRunner, Invocation};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

pub(crate) enum MockResponse {
    Exit { code: i32, stderr: &'static str },
    NotFound,
}

/// What the mock saw during one `run` call.
pub(crate) struct RecordedCall {
    pub invocation: Invocation,
    /// Path named by the passcommand, if one was set.
    pub passphrase_path: Option<PathBuf>,
    /// File content read back while the call was in flight.
    pub passphrase: Option<String>,
}

/// Replays scripted responses in order; answers exit 0 once they run out.
#[derive(Default)]
pub(crate) struct MockRunner {
    responses: Mutex<VecDeque<MockResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn exit(self, code: i32, stderr: &'static str) -> Self {
        self.respond(MockResponse::Exit { code, stderr })
    }

    pub fn calls(&self) -> std::sync::MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

pub(crate) fn passcommand_path(value: &str) -> Option<PathBuf> {
    value
        .strip_prefix("cat '")
        .and_then(|rest| rest.strip_suffix('\''))
        .map(PathBuf::from)
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        let passphrase_path = invocation
            .env_value(PASSCOMMAND_ENV)
            .and_then(|v| v.to_str())
            .and_then(passcommand_path);
        let passphrase = passphrase_path
            .as_ref()
            .and_then(|p| std::fs::read_to_string(p).ok());

        self.calls.lock().unwrap().push(RecordedCall {
            invocation: invocation.clone(),
            passphrase_path,
            passphrase,
        });

        let response = self.responses.lock().unwrap().pop_front();
        match response {
            Some(MockResponse::NotFound) => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "mock: executable not found",
            )),
            Some(MockResponse::Exit { code, stderr }) => Ok(CommandOutput {
                code: Some(code),
                stdout: Vec::new(),
                stderr: stderr.as_bytes().to_vec(),
            }),
            None => Ok(CommandOutput {
                code: Some(0),
                ..Default::default()
            }),
        }
    }
}
