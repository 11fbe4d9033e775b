mod adapter;
mod cli;
mod domain;
mod ports;
mod usecase;
mod wiring;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use adapter::{HistoryRouter, DEFAULT_CENTER};
use cli::args::help_text;
use cli::render;
use cli::{config_to_command, parse_args, print_completion, Config, ParseOutcome};
use common::error::Error;
use common::ports::outbound::{Clock, LogLevel, LogRecord};
use domain::draft::iso_date_from_secs;
use domain::route::ADD;
use domain::{AccessState, JournalCommand, ListFilter, MemoryDraft, PlaceCandidate, PlaceEntry, Route, RouteDecision};
use ports::inbound::UseCaseRunner;
use ports::outbound::Router;
use usecase::access_gate::AccessGate;
use usecase::collection_view::{CollectionView, DreamsView, LoadOutcome, MemoriesView};
use usecase::dreams::DreamsUseCase;
use usecase::home::{search_places, HomeUseCase};
use usecase::post_detail::PostDetailUseCase;
use usecase::save_memory::SaveMemoryUseCase;
use usecase::sign_in::{SignInUseCase, MSG_NOT_ALLOWED};
use wiring::{wire_journal, App, Backend};

const MSG_SIGN_IN_FIRST: &str = "Not signed in. Run `journal sign-in --email <email> --password <password>` first.";

/// Command をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    app: App,
}

impl UseCaseRunner for Runner {
    fn run(&self, config: Config) -> Result<i32, Error> {
        let cmd = config_to_command(config);
        let command_name = cmd.name();
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "cli", "lifecycle", "command started")
                .field("command", command_name),
        );

        let result = self.dispatch(cmd);

        let code = result.as_ref().map_or_else(|e| e.exit_code(), |c| *c);
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "cli", "lifecycle", "command finished")
                .field("command", command_name)
                .field("exit_code", code),
        );
        if let Err(ref e) = result {
            let _ = self.app.logger.log(
                &LogRecord::new(LogLevel::Error, "cli", "error", e.to_string())
                    .field("class", format!("{:?}", e.class()).to_lowercase()),
            );
        }
        result
    }
}

/// 保護画面のコマンドが最初に開く画面
fn start_route(cmd: &JournalCommand) -> Route {
    match cmd {
        JournalCommand::Memories(_) | JournalCommand::Keywords { dreams: false } => Route::my_posts(),
        JournalCommand::Dreams(_)
        | JournalCommand::Keywords { dreams: true }
        | JournalCommand::DeleteDream { .. }
        | JournalCommand::PromoteDream { .. } => Route::dreams(),
        JournalCommand::ShowMemory { id } => Route::post(id),
        JournalCommand::SaveMemory { id: Some(id), .. } => Route::post(id),
        _ => Route::home(),
    }
}

impl Runner {
    fn dispatch(&self, cmd: JournalCommand) -> Result<i32, Error> {
        match cmd {
            JournalCommand::Help => {
                print!("{}", help_text());
                Ok(0)
            }
            JournalCommand::Status { path } => {
                // 保護コマンドと同じく、許可リスト外のセッションはここでも失効させる
                let gate = self.gate(self.app.backend()?);
                let state = gate.mount();
                let router = HistoryRouter::new(Route::to(&path));
                println!("{}", render::status(&state, &path, &gate.guard(&router)));
                Ok(0)
            }
            JournalCommand::SignIn { email, password } => {
                let backend = self.app.backend()?;
                let router = Arc::new(HistoryRouter::new(Route::sign_in()));
                let session = SignInUseCase::new(
                    Arc::clone(&backend.auth),
                    Arc::clone(&backend.tables),
                    self.app.config.allow_list.clone(),
                    router,
                    Arc::clone(&self.app.logger),
                )
                .sign_in(&email, &password)?;
                println!("Signed in as {}", session.display_name());
                Ok(0)
            }
            JournalCommand::SignOut => {
                let backend = self.app.backend()?;
                let router = Arc::new(HistoryRouter::new(Route::home()));
                SignInUseCase::new(
                    Arc::clone(&backend.auth),
                    Arc::clone(&backend.tables),
                    self.app.config.allow_list.clone(),
                    router,
                    Arc::clone(&self.app.logger),
                )
                .sign_out()?;
                println!("Signed out");
                Ok(0)
            }
            other => self.run_protected(other),
        }
    }

    fn gate(&self, backend: &Backend) -> AccessGate {
        AccessGate::new(
            Arc::clone(&backend.auth),
            self.app.config.allow_list.clone(),
            Arc::clone(&self.app.logger),
        )
    }

    fn today(&self) -> String {
        iso_date_from_secs(self.app.clock.now_secs())
    }

    /// ゲートを通ってから保護画面のコマンドを実行する
    fn run_protected(&self, cmd: JournalCommand) -> Result<i32, Error> {
        let name = cmd.name();
        let backend = self.app.backend()?;
        let router = Arc::new(HistoryRouter::new(start_route(&cmd)));
        let gate = self.gate(backend);
        let state = gate.mount();
        if let RouteDecision::Redirect(_) = gate.guard(router.as_ref()) {
            return Err(match state {
                AccessState::Denied(_) => Error::forbidden(MSG_NOT_ALLOWED),
                _ => Error::session(MSG_SIGN_IN_FIRST),
            });
        }

        match cmd {
            JournalCommand::Home => {
                let summary = HomeUseCase::new(Arc::clone(&backend.tables), Arc::clone(&self.app.logger)).summary();
                println!("{}", render::home(&summary));
            }
            JournalCommand::Memories(filter) => {
                let view = MemoriesView::memories(Arc::clone(&backend.tables), Arc::clone(&self.app.logger));
                let shown = show_filtered(&view, &filter)?;
                println!("{}", render::lines(&shown, "(no memories)", render::memory_line));
            }
            JournalCommand::Dreams(filter) => {
                let view = DreamsView::dreams(Arc::clone(&backend.tables), Arc::clone(&self.app.logger));
                let shown = show_filtered(&view, &filter)?;
                println!("{}", render::lines(&shown, "(no dreams)", render::dream_line));
            }
            JournalCommand::Keywords { dreams } => {
                let keywords = if dreams {
                    let view = DreamsView::dreams(Arc::clone(&backend.tables), Arc::clone(&self.app.logger));
                    show_filtered(&view, &ListFilter::default())?;
                    view.available_keywords()
                } else {
                    let view = MemoriesView::memories(Arc::clone(&backend.tables), Arc::clone(&self.app.logger));
                    show_filtered(&view, &ListFilter::default())?;
                    view.available_keywords()
                };
                for k in &keywords {
                    println!("{}", k);
                }
            }
            JournalCommand::ShowMemory { id } => {
                let detail = self.post_detail(backend, &router).load(&id)?;
                println!("{}", render::detail(&detail));
            }
            JournalCommand::SaveMemory { id, fields, photos } => {
                match id {
                    Some(id) => {
                        let detail = self.post_detail(backend, &router);
                        let memory = detail.load(&id)?.memory;
                        detail.open_edit(&memory);
                    }
                    None => router.push(Route::to(ADD)),
                }
                // 入力画面は遷移パラメータから下書きを復元する
                let params = router.current().map(|r| r.params).unwrap_or_default();
                let mut draft = MemoryDraft::from_route_params(&params, &self.today());
                fields.apply_to(&mut draft);
                let photos: Vec<PathBuf> = photos.iter().map(PathBuf::from).collect();
                let saved = SaveMemoryUseCase::new(
                    Arc::clone(&backend.auth),
                    Arc::clone(&backend.tables),
                    Arc::clone(&backend.storage),
                    Arc::clone(&self.app.fs),
                    Arc::clone(&self.app.clock),
                    router.clone(),
                    Arc::clone(&self.app.logger),
                    &self.app.config.photo_bucket,
                )
                .save(&draft, &photos)?;
                println!("Saved memory {} ({})", saved, router.current_path());
            }
            JournalCommand::DeleteDream { id } => {
                let view = DreamsView::dreams(Arc::clone(&backend.tables), Arc::clone(&self.app.logger));
                show_filtered(&view, &ListFilter::default())?;
                if view.find(&id).is_none() {
                    return Err(Error::not_found(format!("no dream with id {}", id)));
                }
                view.delete(&id)?;
                println!("Deleted dream {}", id);
            }
            JournalCommand::PromoteDream { id } => {
                let view = DreamsView::dreams(Arc::clone(&backend.tables), Arc::clone(&self.app.logger));
                show_filtered(&view, &ListFilter::default())?;
                let dream = view
                    .find(&id)
                    .ok_or_else(|| Error::not_found(format!("no dream with id {}", id)))?;
                let draft = self.dreams(backend, &router).promote(&dream);
                println!("{}", render::draft(&draft));
                println!("\nto save: {}", render::save_hint(&draft));
            }
            JournalCommand::SearchPlaces { query, around } => {
                let found = self.search(&query, around)?;
                println!("{}", render::lines(&found, "(no places found)", render::candidate_line));
            }
            JournalCommand::AddDream { query, around, keyword } => {
                let first = self.first_place(&query, around)?;
                let dream = self
                    .dreams(backend, &router)
                    .add_from_candidate(&first, keyword.as_deref())?;
                println!("Added dream {}", render::dream_line(&dream));
            }
            JournalCommand::DraftFromPlace { query, around, keyword } => {
                let first = self.first_place(&query, around)?;
                let draft = self
                    .dreams(backend, &router)
                    .draft_candidate(&first, keyword.as_deref());
                println!("{}", render::draft(&draft));
                println!("\nto save: {}", render::save_hint(&draft));
            }
            JournalCommand::Help
            | JournalCommand::Status { .. }
            | JournalCommand::SignIn { .. }
            | JournalCommand::SignOut => {
                return Err(Error::system(format!("{} does not go through the access gate", name)))
            }
        }
        Ok(0)
    }

    fn post_detail(&self, backend: &Backend, router: &Arc<HistoryRouter>) -> PostDetailUseCase {
        PostDetailUseCase::new(
            Arc::clone(&backend.tables),
            Arc::clone(&backend.storage),
            Arc::clone(&self.app.clock),
            router.clone(),
            Arc::clone(&self.app.logger),
            &self.app.config.photo_bucket,
        )
    }

    fn dreams(&self, backend: &Backend, router: &Arc<HistoryRouter>) -> DreamsUseCase {
        DreamsUseCase::new(
            Arc::clone(&backend.auth),
            Arc::clone(&backend.tables),
            Arc::clone(&self.app.clock),
            router.clone(),
            Arc::clone(&self.app.logger),
        )
    }

    fn search(&self, query: &str, around: Option<domain::Coordinate>) -> Result<Vec<PlaceCandidate>, Error> {
        search_places(
            self.app.place_search()?,
            self.app.logger.as_ref(),
            query,
            around.unwrap_or(DEFAULT_CENTER),
        )
    }

    fn first_place(&self, query: &str, around: Option<domain::Coordinate>) -> Result<PlaceCandidate, Error> {
        self.search(query, around)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("no place found for '{}'", query.trim())))
    }
}

/// 一覧を読み込み、絞り込みを反映した表示分を返す
fn show_filtered<E>(view: &CollectionView<E>, filter: &ListFilter) -> Result<Vec<E>, Error>
where
    E: PlaceEntry + Clone + serde::de::DeserializeOwned,
{
    let _active = view.activate();
    if let LoadOutcome::Failed = view.load() {
        if let Some(e) = view.error() {
            return Err(e);
        }
    }
    if view.is_loading() {
        println!("(loading)");
    }
    view.select_keyword(filter.keyword.as_deref());
    view.set_search_query(&filter.query);
    if let Some(header) = render::filter_header(&view.filter_state()) {
        println!("{}", header);
    }
    Ok(view.displayed())
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("journal: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    let outcome = parse_args()?;
    let config = match outcome {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
    };
    let app = wire_journal(config.verbose)?;
    let runner = Runner { app };
    runner.run(config)
}

fn print_usage() {
    eprintln!("Usage: journal [options] <command> [args...]");
}
