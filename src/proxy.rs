//! BA-side proxy for engine operations.
//!
//! [`EngineProxy`] owns a [`PipeChannel`] and implements
//! [`BootstrapperEngine`] by turning every call into one request/reply
//! exchange. Nothing is retried and nothing is cached.
//!
//! # Example
//!
//! ```no_run
//! # async fn run(path: &str) -> bawire::error::Result<()> {
//! use bawire::channel::{ChannelConfig, PipeChannel};
//! use bawire::proxy::{BootstrapperEngine, EngineProxy};
//!
//! let channel = PipeChannel::connect(path, "secret", ChannelConfig::default()).await?;
//! let mut engine = EngineProxy::new(channel);
//! let install_folder = engine.get_variable_string("InstallFolder", 260).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::channel::PipeChannel;
use crate::codec::WireStruct;
use crate::error::{BawireError, Result};
use crate::messages::engine::*;
use crate::messages::types::{Action, LogLevel};
use crate::messages::Exchange;
use crate::protocol::{decode_reply, encode_request};
use crate::status::Status;

/// Operations a bootstrapper application can invoke on the engine.
///
/// String-returning operations take a `capacity` in UTF-16 units including
/// the terminator. A value that does not fit fails with
/// [`BawireError::MoreData`] carrying the size to retry with.
#[async_trait]
pub trait BootstrapperEngine: Send {
    async fn get_package_count(&mut self) -> Result<u32>;

    async fn get_variable_numeric(&mut self, variable: &str) -> Result<i64>;

    async fn get_variable_string(&mut self, variable: &str, capacity: u32) -> Result<String>;

    async fn get_variable_version(&mut self, variable: &str, capacity: u32) -> Result<String>;

    /// Expand `[Variable]` references in `input`.
    async fn format_string(&mut self, input: &str, capacity: u32) -> Result<String>;

    async fn escape_string(&mut self, input: &str, capacity: u32) -> Result<String>;

    async fn evaluate_condition(&mut self, condition: &str) -> Result<bool>;

    async fn log(&mut self, level: LogLevel, message: &str) -> Result<()>;

    async fn send_embedded_error(
        &mut self,
        error_code: u32,
        message: &str,
        ui_hint: u32,
    ) -> Result<i32>;

    async fn send_embedded_progress(
        &mut self,
        progress_percentage: u32,
        overall_percentage: u32,
    ) -> Result<i32>;

    async fn set_update(&mut self, update: SetUpdateArgs) -> Result<()>;

    async fn set_local_source(
        &mut self,
        package_or_container_id: &str,
        payload_id: Option<&str>,
        path: &str,
    ) -> Result<()>;

    async fn set_download_source(
        &mut self,
        package_or_container_id: &str,
        payload_id: Option<&str>,
        url: &str,
        user: Option<&str>,
        password: Option<&str>,
        authorization_header: Option<&str>,
    ) -> Result<()>;

    async fn set_variable_numeric(&mut self, variable: &str, value: i64) -> Result<()>;

    /// `None` removes the variable.
    async fn set_variable_string(
        &mut self,
        variable: &str,
        value: Option<&str>,
        formatted: bool,
    ) -> Result<()>;

    async fn set_variable_version(&mut self, variable: &str, value: Option<&str>) -> Result<()>;

    async fn close_splash_screen(&mut self) -> Result<()>;

    async fn detect(&mut self, parent_window: u64) -> Result<()>;

    async fn plan(&mut self, action: Action) -> Result<()>;

    async fn elevate(&mut self, parent_window: u64) -> Result<()>;

    async fn apply(&mut self, parent_window: u64) -> Result<()>;

    async fn quit(&mut self, exit_code: u32) -> Result<()>;

    async fn launch_approved_exe(
        &mut self,
        parent_window: u64,
        approved_exe_for_elevation_id: &str,
        arguments: Option<&str>,
        wait_for_input_idle_timeout: u32,
    ) -> Result<()>;

    async fn set_update_source(
        &mut self,
        url: &str,
        authorization_header: Option<&str>,
    ) -> Result<()>;

    /// Negative, zero or positive as `version1` sorts before, equal to or
    /// after `version2`.
    async fn compare_versions(&mut self, version1: &str, version2: &str) -> Result<i32>;

    async fn get_related_bundle_variable(
        &mut self,
        bundle_code: &str,
        variable: &str,
        capacity: u32,
    ) -> Result<String>;
}

/// Engine proxy over a pipe channel.
pub struct EngineProxy<S> {
    channel: PipeChannel<S>,
}

impl<S> EngineProxy<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(channel: PipeChannel<S>) -> Self {
        Self { channel }
    }

    /// Give the channel back.
    pub fn into_channel(self) -> PipeChannel<S> {
        self.channel
    }

    /// Run one exchange and return the raw reply status with the results.
    async fn exchange<M: Exchange>(
        &mut self,
        args: M::Args,
        skeleton: M::Results,
    ) -> Result<(Status, M::Results)> {
        let payload = encode_request(&args.encode(), &skeleton.encode());
        let reply = self.channel.call(M::MESSAGE_TYPE, &payload).await?;

        let (status, results) = decode_reply(&reply)?;
        let results = if results.is_empty() {
            M::Results::default()
        } else {
            M::Results::decode(results)?
        };

        if status.is_failure() {
            tracing::debug!(operation = M::NAME, %status, "engine returned failure");
        }
        Ok((status, results))
    }

    /// Run one exchange, turning a failure status into an error.
    async fn invoke<M: Exchange>(&mut self, args: M::Args) -> Result<M::Results> {
        let (status, results) = self.exchange::<M>(args, M::Results::default()).await?;
        if status.is_failure() {
            return Err(BawireError::from_status(status, 0));
        }
        Ok(results)
    }
}

/// Apply the caller-capacity contract to a string reply.
///
/// `cch` is the length field of the reply. An absent value reads as empty.
fn take_string(status: Status, cch: u32, value: Option<String>, capacity: u32) -> Result<String> {
    if status == Status::MORE_DATA {
        return Err(BawireError::MoreData { required: cch });
    }
    if status.is_failure() {
        return Err(BawireError::from_status(status, cch));
    }

    let value = value.unwrap_or_default();
    if value.is_empty() {
        return Ok(value);
    }

    let required = value.encode_utf16().count() as u32 + 1;
    if capacity < required {
        return Err(BawireError::MoreData { required });
    }
    Ok(value)
}

#[async_trait]
impl<S> BootstrapperEngine for EngineProxy<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn get_package_count(&mut self) -> Result<u32> {
        let results = self
            .invoke::<GetPackageCount>(GetPackageCountArgs::default())
            .await?;
        Ok(results.package_count)
    }

    async fn get_variable_numeric(&mut self, variable: &str) -> Result<i64> {
        let args = GetVariableNumericArgs {
            variable: Some(variable.to_string()),
            ..Default::default()
        };
        Ok(self.invoke::<GetVariableNumeric>(args).await?.value)
    }

    async fn get_variable_string(&mut self, variable: &str, capacity: u32) -> Result<String> {
        let args = GetVariableStringArgs {
            variable: Some(variable.to_string()),
            ..Default::default()
        };
        let skeleton = GetVariableStringResults {
            cch_value: capacity,
            ..Default::default()
        };
        let (status, results) = self.exchange::<GetVariableString>(args, skeleton).await?;
        take_string(status, results.cch_value, results.value, capacity)
    }

    async fn get_variable_version(&mut self, variable: &str, capacity: u32) -> Result<String> {
        let args = GetVariableVersionArgs {
            variable: Some(variable.to_string()),
            ..Default::default()
        };
        let skeleton = GetVariableVersionResults {
            cch_value: capacity,
            ..Default::default()
        };
        let (status, results) = self.exchange::<GetVariableVersion>(args, skeleton).await?;
        take_string(status, results.cch_value, results.value, capacity)
    }

    async fn format_string(&mut self, input: &str, capacity: u32) -> Result<String> {
        let args = FormatStringArgs {
            input: Some(input.to_string()),
            ..Default::default()
        };
        let skeleton = FormatStringResults {
            cch_out: capacity,
            ..Default::default()
        };
        let (status, results) = self.exchange::<FormatString>(args, skeleton).await?;
        take_string(status, results.cch_out, results.out, capacity)
    }

    async fn escape_string(&mut self, input: &str, capacity: u32) -> Result<String> {
        let args = EscapeStringArgs {
            input: Some(input.to_string()),
            ..Default::default()
        };
        let skeleton = EscapeStringResults {
            cch_out: capacity,
            ..Default::default()
        };
        let (status, results) = self.exchange::<EscapeString>(args, skeleton).await?;
        take_string(status, results.cch_out, results.out, capacity)
    }

    async fn evaluate_condition(&mut self, condition: &str) -> Result<bool> {
        let args = EvaluateConditionArgs {
            condition: Some(condition.to_string()),
            ..Default::default()
        };
        Ok(self.invoke::<EvaluateCondition>(args).await?.value)
    }

    async fn log(&mut self, level: LogLevel, message: &str) -> Result<()> {
        let args = LogArgs {
            level,
            message: Some(message.to_string()),
            ..Default::default()
        };
        self.invoke::<Log>(args).await.map(|_| ())
    }

    async fn send_embedded_error(
        &mut self,
        error_code: u32,
        message: &str,
        ui_hint: u32,
    ) -> Result<i32> {
        let args = SendEmbeddedErrorArgs {
            error_code,
            message: Some(message.to_string()),
            ui_hint,
            ..Default::default()
        };
        Ok(self.invoke::<SendEmbeddedError>(args).await?.result)
    }

    async fn send_embedded_progress(
        &mut self,
        progress_percentage: u32,
        overall_percentage: u32,
    ) -> Result<i32> {
        let args = SendEmbeddedProgressArgs {
            progress_percentage,
            overall_percentage,
            ..Default::default()
        };
        Ok(self.invoke::<SendEmbeddedProgress>(args).await?.result)
    }

    async fn set_update(&mut self, update: SetUpdateArgs) -> Result<()> {
        self.invoke::<SetUpdate>(update).await.map(|_| ())
    }

    async fn set_local_source(
        &mut self,
        package_or_container_id: &str,
        payload_id: Option<&str>,
        path: &str,
    ) -> Result<()> {
        let args = SetLocalSourceArgs {
            package_or_container_id: Some(package_or_container_id.to_string()),
            payload_id: payload_id.map(str::to_string),
            path: Some(path.to_string()),
            ..Default::default()
        };
        self.invoke::<SetLocalSource>(args).await.map(|_| ())
    }

    async fn set_download_source(
        &mut self,
        package_or_container_id: &str,
        payload_id: Option<&str>,
        url: &str,
        user: Option<&str>,
        password: Option<&str>,
        authorization_header: Option<&str>,
    ) -> Result<()> {
        let args = SetDownloadSourceArgs {
            package_or_container_id: Some(package_or_container_id.to_string()),
            payload_id: payload_id.map(str::to_string),
            url: Some(url.to_string()),
            user: user.map(str::to_string),
            password: password.map(str::to_string),
            authorization_header: authorization_header.map(str::to_string),
            ..Default::default()
        };
        self.invoke::<SetDownloadSource>(args).await.map(|_| ())
    }

    async fn set_variable_numeric(&mut self, variable: &str, value: i64) -> Result<()> {
        let args = SetVariableNumericArgs {
            variable: Some(variable.to_string()),
            value,
            ..Default::default()
        };
        self.invoke::<SetVariableNumeric>(args).await.map(|_| ())
    }

    async fn set_variable_string(
        &mut self,
        variable: &str,
        value: Option<&str>,
        formatted: bool,
    ) -> Result<()> {
        let args = SetVariableStringArgs {
            variable: Some(variable.to_string()),
            value: value.map(str::to_string),
            formatted,
            ..Default::default()
        };
        self.invoke::<SetVariableString>(args).await.map(|_| ())
    }

    async fn set_variable_version(&mut self, variable: &str, value: Option<&str>) -> Result<()> {
        let args = SetVariableVersionArgs {
            variable: Some(variable.to_string()),
            value: value.map(str::to_string),
            ..Default::default()
        };
        self.invoke::<SetVariableVersion>(args).await.map(|_| ())
    }

    async fn close_splash_screen(&mut self) -> Result<()> {
        self.invoke::<CloseSplashScreen>(CloseSplashScreenArgs::default())
            .await
            .map(|_| ())
    }

    async fn detect(&mut self, parent_window: u64) -> Result<()> {
        let args = DetectArgs {
            parent_window,
            ..Default::default()
        };
        self.invoke::<Detect>(args).await.map(|_| ())
    }

    async fn plan(&mut self, action: Action) -> Result<()> {
        let args = PlanArgs {
            action,
            ..Default::default()
        };
        self.invoke::<Plan>(args).await.map(|_| ())
    }

    async fn elevate(&mut self, parent_window: u64) -> Result<()> {
        let args = ElevateArgs {
            parent_window,
            ..Default::default()
        };
        self.invoke::<Elevate>(args).await.map(|_| ())
    }

    async fn apply(&mut self, parent_window: u64) -> Result<()> {
        let args = ApplyArgs {
            parent_window,
            ..Default::default()
        };
        self.invoke::<Apply>(args).await.map(|_| ())
    }

    async fn quit(&mut self, exit_code: u32) -> Result<()> {
        let args = QuitArgs {
            exit_code,
            ..Default::default()
        };
        self.invoke::<Quit>(args).await.map(|_| ())
    }

    async fn launch_approved_exe(
        &mut self,
        parent_window: u64,
        approved_exe_for_elevation_id: &str,
        arguments: Option<&str>,
        wait_for_input_idle_timeout: u32,
    ) -> Result<()> {
        let args = LaunchApprovedExeArgs {
            parent_window,
            approved_exe_for_elevation_id: Some(approved_exe_for_elevation_id.to_string()),
            arguments: arguments.map(str::to_string),
            wait_for_input_idle_timeout,
            ..Default::default()
        };
        self.invoke::<LaunchApprovedExe>(args).await.map(|_| ())
    }

    async fn set_update_source(
        &mut self,
        url: &str,
        authorization_header: Option<&str>,
    ) -> Result<()> {
        let args = SetUpdateSourceArgs {
            url: Some(url.to_string()),
            authorization_header: authorization_header.map(str::to_string),
            ..Default::default()
        };
        self.invoke::<SetUpdateSource>(args).await.map(|_| ())
    }

    async fn compare_versions(&mut self, version1: &str, version2: &str) -> Result<i32> {
        let args = CompareVersionsArgs {
            version1: Some(version1.to_string()),
            version2: Some(version2.to_string()),
            ..Default::default()
        };
        Ok(self.invoke::<CompareVersions>(args).await?.result)
    }

    async fn get_related_bundle_variable(
        &mut self,
        bundle_code: &str,
        variable: &str,
        capacity: u32,
    ) -> Result<String> {
        let args = GetRelatedBundleVariableArgs {
            bundle_code: Some(bundle_code.to_string()),
            variable: Some(variable.to_string()),
            ..Default::default()
        };
        let skeleton = GetRelatedBundleVariableResults {
            cch_value: capacity,
            ..Default::default()
        };
        let (status, results) = self
            .exchange::<GetRelatedBundleVariable>(args, skeleton)
            .await?;
        take_string(status, results.cch_value, results.value, capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{decode_request, encode_reply};
    use tokio::io::{duplex, DuplexStream};

    /// Answer exactly one request with `status` and `results`, returning
    /// what was received.
    fn one_shot_engine(
        mut channel: PipeChannel<DuplexStream>,
        status: Status,
        results: bytes::Bytes,
    ) -> tokio::task::JoinHandle<(u32, Vec<u8>, Vec<u8>)> {
        tokio::spawn(async move {
            let message = channel.receive_message().await.unwrap().unwrap();
            let (args, skeleton) = decode_request(&message.payload).unwrap();
            let seen = (message.message_type, args.to_vec(), skeleton.to_vec());
            channel
                .send_message(message.message_type, &encode_reply(status, &results))
                .await
                .unwrap();
            seen
        })
    }

    fn proxy_pair() -> (EngineProxy<DuplexStream>, PipeChannel<DuplexStream>) {
        let (a, b) = duplex(4096);
        (
            EngineProxy::new(PipeChannel::new(a)),
            PipeChannel::new(b),
        )
    }

    #[test]
    fn test_take_string_contract() {
        assert_eq!(take_string(Status::OK, 0, None, 0).unwrap(), "");
        assert_eq!(
            take_string(Status::OK, 0, Some(String::new()), 0).unwrap(),
            ""
        );
        assert!(matches!(
            take_string(Status::OK, 3, Some("abc".into()), 0),
            Err(BawireError::MoreData { required: 4 })
        ));
        assert!(matches!(
            take_string(Status::OK, 3, Some("abc".into()), 3),
            Err(BawireError::MoreData { required: 4 })
        ));
        assert_eq!(
            take_string(Status::OK, 3, Some("abc".into()), 4).unwrap(),
            "abc"
        );
        assert!(matches!(
            take_string(Status::MORE_DATA, 9, None, 2),
            Err(BawireError::MoreData { required: 9 })
        ));
        assert!(matches!(
            take_string(Status::NOT_FOUND, 0, None, 10),
            Err(BawireError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_get_variable_string_sends_capacity_in_skeleton() {
        let (mut proxy, engine) = proxy_pair();
        let reply = GetVariableStringResults {
            cch_value: 5,
            value: Some("hello".into()),
            ..Default::default()
        };
        let engine = one_shot_engine(engine, Status::OK, reply.encode());

        let value = proxy.get_variable_string("Greeting", 64).await.unwrap();
        assert_eq!(value, "hello");

        let (message_type, args, skeleton) = engine.await.unwrap();
        assert_eq!(message_type, GetVariableString::MESSAGE_TYPE);
        let args = GetVariableStringArgs::decode(&args).unwrap();
        assert_eq!(args.variable.as_deref(), Some("Greeting"));
        let skeleton = GetVariableStringResults::decode(&skeleton).unwrap();
        assert_eq!(skeleton.cch_value, 64);
    }

    #[tokio::test]
    async fn test_zero_capacity_reports_more_data() {
        let (mut proxy, engine) = proxy_pair();
        let reply = FormatStringResults {
            cch_out: 3,
            out: Some("abc".into()),
            ..Default::default()
        };
        let engine = one_shot_engine(engine, Status::OK, reply.encode());

        let result = proxy.format_string("[X]", 0).await;
        assert!(matches!(result, Err(BawireError::MoreData { required: 4 })));
        engine.await.unwrap();
    }

    #[tokio::test]
    async fn test_failure_status_maps_to_error() {
        let (mut proxy, engine) = proxy_pair();
        let engine = one_shot_engine(
            engine,
            Status::NOT_FOUND,
            crate::codec::encode_version_only(crate::codec::API_VERSION),
        );

        let result = proxy.get_variable_numeric("Missing").await;
        assert!(matches!(result, Err(BawireError::NotFound)));
        engine.await.unwrap();
    }

    #[tokio::test]
    async fn test_plan_sends_action() {
        let (mut proxy, engine) = proxy_pair();
        let engine = one_shot_engine(engine, Status::OK, PlanResults::default().encode());

        proxy.plan(Action::Install).await.unwrap();

        let (message_type, args, _) = engine.await.unwrap();
        assert_eq!(message_type, 19);
        assert_eq!(PlanArgs::decode(&args).unwrap().action, Action::Install);
    }

    #[tokio::test]
    async fn test_set_download_source_sends_authorization_header() {
        let (mut proxy, engine) = proxy_pair();
        let engine = one_shot_engine(
            engine,
            Status::OK,
            SetDownloadSourceResults::default().encode(),
        );

        proxy
            .set_download_source(
                "NetFx",
                None,
                "https://example.com/netfx.exe",
                Some("user"),
                None,
                Some("Bearer abc"),
            )
            .await
            .unwrap();

        let (message_type, args, _) = engine.await.unwrap();
        assert_eq!(message_type, SetDownloadSource::MESSAGE_TYPE);
        let args = SetDownloadSourceArgs::decode(&args).unwrap();
        assert_eq!(args.package_or_container_id.as_deref(), Some("NetFx"));
        assert_eq!(args.user.as_deref(), Some("user"));
        assert_eq!(args.password, None);
        assert_eq!(args.authorization_header.as_deref(), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_engine_gone_is_connection_closed() {
        let (mut proxy, engine) = proxy_pair();
        drop(engine);

        let result = proxy.get_package_count().await;
        assert!(result.is_err());
    }
}
