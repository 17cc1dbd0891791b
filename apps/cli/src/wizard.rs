//! Interactive reading wizard over stdin/stdout.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use client_core::{SessionController, SessionError, SessionEvent};
use shared::domain::SpreadId;
use tokio::{
    io::{self, AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::broadcast,
    time::{self, Instant},
};
use tracing::warn;
use views::{
    dispatch,
    steps::{MysticalTicker, SpreadSelectionView},
    Intent, StepView,
};

use crate::render;

type Input = Lines<BufReader<Stdin>>;

pub async fn run(
    controller: &Arc<SessionController>,
    question: Option<String>,
    spread: Option<SpreadId>,
) -> Result<()> {
    let mut input = BufReader::new(io::stdin()).lines();
    let mut events = controller.subscribe();
    controller.load_spreads().await;

    ask_question(controller, &mut input, question).await?;
    choose_spread(controller, &mut input, spread).await?;
    draw(controller, &mut events).await?;

    match StepView::render(&controller.snapshot().await) {
        StepView::Result(result) => render::print_result(&result),
        other => bail!("reading ended at {:?}", other.step()),
    }
    Ok(())
}

async fn prompt(input: &mut Input, label: &str) -> Result<String> {
    println!("{label}");
    input
        .next_line()
        .await
        .context("failed to read stdin")?
        .context("stdin closed")
}

async fn ask_question(
    controller: &Arc<SessionController>,
    input: &mut Input,
    mut question: Option<String>,
) -> Result<()> {
    loop {
        let text = match question.take() {
            Some(text) => text,
            None => prompt(input, "请输入你的问题:").await?,
        };
        match dispatch(controller, Intent::SubmitQuestion(text)).await {
            Ok(()) => return Ok(()),
            Err(SessionError::BlankQuestion) => println!("问题不能为空"),
            Err(err) => return Err(err.into()),
        }
    }
}

async fn choose_spread(
    controller: &Arc<SessionController>,
    input: &mut Input,
    mut spread: Option<SpreadId>,
) -> Result<()> {
    let recommended = controller.recommend_spread().await?;
    loop {
        let spread_id = match spread.take() {
            Some(spread_id) => spread_id,
            None => {
                let StepView::SpreadSelection(selection) =
                    StepView::render(&controller.snapshot().await)
                else {
                    bail!("spread selection is not available");
                };
                print_options(&selection, &recommended.spread_id);
                println!("推荐: {}", recommended.reason);
                let answer = prompt(input, "选择牌阵 (序号或 id，回车使用推荐):").await?;
                match pick(&selection, answer.trim())
                    .or_else(|| default_spread(&selection, &recommended.spread_id))
                {
                    Some(spread_id) => spread_id,
                    None => bail!("no spreads available"),
                }
            }
        };
        match dispatch(controller, Intent::SelectSpread(spread_id)).await {
            Ok(()) => return Ok(()),
            Err(SessionError::UnknownSpread(spread_id)) => println!("未知牌阵: {spread_id}"),
            Err(err) => return Err(err.into()),
        }
    }
}

fn print_options(selection: &SpreadSelectionView, recommended: &SpreadId) {
    for (index, spread) in selection.options.iter().enumerate() {
        let marker = if &spread.id == recommended { " *" } else { "" };
        println!(
            "{}. {} [{}] {} 张牌{marker}",
            index + 1,
            spread.name,
            spread.id,
            spread.card_count
        );
    }
}

fn pick(selection: &SpreadSelectionView, answer: &str) -> Option<SpreadId> {
    if answer.is_empty() {
        return None;
    }
    if let Ok(number) = answer.parse::<usize>() {
        return selection
            .options
            .get(number.checked_sub(1)?)
            .map(|spread| spread.id.clone());
    }
    Some(SpreadId::from(answer))
}

/// The recommended spread when it can be selected, otherwise the first
/// listed one.
fn default_spread(selection: &SpreadSelectionView, recommended: &SpreadId) -> Option<SpreadId> {
    selection
        .options
        .iter()
        .find(|spread| &spread.id == recommended)
        .or_else(|| selection.options.first())
        .map(|spread| spread.id.clone())
}

/// Starts the draw and shows the placeholder cards and mystical lines until
/// the reading arrives.
async fn draw(
    controller: &Arc<SessionController>,
    events: &mut broadcast::Receiver<SessionEvent>,
) -> Result<()> {
    let spread_id = controller
        .snapshot()
        .await
        .session
        .spread_id
        .unwrap_or_default();
    let ticker = MysticalTicker::for_spread(spread_id.as_str());
    println!("正在占卜，预计{}", ticker.duration());

    let started = Instant::now();
    let mut tick = time::interval(ticker.interval());
    let draw = dispatch(controller, Intent::StartDraw);
    tokio::pin!(draw);

    loop {
        tokio::select! {
            outcome = &mut draw => return outcome.map_err(Into::into),
            _ = tick.tick() => println!("{}", ticker.line_at(started.elapsed())),
            event = events.recv() => match event {
                Ok(SessionEvent::StateChanged(snapshot)) => {
                    if let StepView::Drawing(drawing) = StepView::render(&snapshot) {
                        render::print_cards(&drawing.cards);
                    }
                }
                Ok(SessionEvent::DrawFellBack { reason, .. }) => {
                    warn!(reason = %reason, "tarot: backend reading unavailable");
                }
                Ok(SessionEvent::StaleResponseDiscarded { .. }) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "tarot: missed session events");
                }
                Err(broadcast::error::RecvError::Closed) => {}
            },
        }
    }
}
