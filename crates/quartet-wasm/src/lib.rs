//! WebAssembly bindings for the Quartet puzzle
//!
//! Boards are generated asynchronously on the browser event loop. Each call
//! to `newGame` supersedes any generation still in flight, so only the most
//! recent request can install a board.

use async_trait::async_trait;
use gloo::timers::future::TimeoutFuture;
use quartet_core::{GameState, GenerateError, Generator, HttpCatalog, Pause, Throttled};
use std::cell::{Cell, RefCell};
use std::fmt::Display;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod bridge;


pub use bridge::Options;

// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Delay backed by `setTimeout`
struct BrowserPause;

#[async_trait(?Send)]
impl Pause for BrowserPause {
    async fn pause(&self, duration: Duration) {
        TimeoutFuture::new(bridge::timeout_millis(duration)).await;
    }
}

type Catalog = Throttled<HttpCatalog, BrowserPause>;

fn js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(js_error)
}

/// The main WASM game controller
#[wasm_bindgen]
pub struct QuartetGame {
    generator: Rc<Generator<Catalog>>,
    state: Rc<RefCell<Option<GameState>>>,
    generating: Rc<Cell<bool>>,
}

#[wasm_bindgen]
impl QuartetGame {
    /// Create a controller; `options` may be undefined
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<QuartetGame, JsValue> {
        let options: Options = if options.is_undefined() || options.is_null() {
            Options::default()
        } else {
            serde_wasm_bindgen::from_value(options).map_err(js_error)?
        };
        let resolved = options.resolve().map_err(js_error)?;

        let catalog = Throttled::new(HttpCatalog::new(&resolved.catalog), BrowserPause, resolved.throttle);
        Ok(QuartetGame {
            generator: Rc::new(Generator::new(catalog, resolved.generator)),
            state: Rc::new(RefCell::new(None)),
            generating: Rc::new(Cell::new(false)),
        })
    }

    /// Start building a new board.
    ///
    /// `callback` is invoked as `callback(null)` once the board is installed,
    /// or `callback(message)` on failure. A superseded request never calls back.
    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&self, fresh_pool: bool, callback: Option<js_sys::Function>) {
        let ticket = self.generator.guard().begin();
        self.generating.set(true);

        let generator = Rc::clone(&self.generator);
        let state = Rc::clone(&self.state);
        let generating = Rc::clone(&self.generating);

        spawn_local(async move {
            let outcome = match generator.generate_guarded(&ticket, fresh_pool).await {
                Ok(game) if ticket.is_current() => {
                    *state.borrow_mut() = Some(game);
                    JsValue::NULL
                }
                Ok(_) | Err(GenerateError::Superseded) => return,
                Err(err) => {
                    gloo::console::error!("board generation failed", err.to_string());
                    js_error(err)
                }
            };
            generating.set(false);
            if let Some(callback) = callback {
                if let Err(err) = callback.call1(&JsValue::NULL, &outcome) {
                    gloo::console::warn!("newGame callback threw", err);
                }
            }
        });
    }

    #[wasm_bindgen(js_name = isGenerating)]
    pub fn is_generating(&self) -> bool {
        self.generating.get()
    }

    #[wasm_bindgen(js_name = hasBoard)]
    pub fn has_board(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Serialized board view, or null before the first board
    pub fn board(&self) -> Result<JsValue, JsValue> {
        match self.state.borrow().as_ref() {
            Some(game) => to_js(&game.view()),
            None => Ok(JsValue::NULL),
        }
    }

    /// Toggle a board position; returns "selected", "deselected" or "ignored"
    #[wasm_bindgen(js_name = toggleSelect)]
    pub fn toggle_select(&self, position: usize) -> Result<JsValue, JsValue> {
        self.with_game(|game| game.toggle_select(position).map_err(js_error))
            .and_then(|toggle| to_js(&toggle))
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&self) -> Result<(), JsValue> {
        self.with_game(|game| {
            game.clear_selection();
            Ok(())
        })
    }

    /// Submit the current selection
    #[wasm_bindgen(js_name = submitSelection)]
    pub fn submit_selection(&self) -> Result<JsValue, JsValue> {
        self.with_game(|game| game.submit_selection().map_err(js_error))
            .and_then(|outcome| to_js(&outcome))
    }

    /// Submit an explicit list of item identifiers
    #[wasm_bindgen(js_name = submitGuess)]
    pub fn submit_guess(&self, ids: Vec<String>) -> Result<JsValue, JsValue> {
        self.with_game(|game| game.submit_guess(&ids).map_err(js_error))
            .and_then(|outcome| to_js(&outcome))
    }

    /// Expose every group; the board accepts no further input
    pub fn reveal(&self) -> Result<JsValue, JsValue> {
        self.with_game(|game| Ok(game.reveal()))
            .and_then(|groups| to_js(&groups))
    }

    #[wasm_bindgen(js_name = isWon)]
    pub fn is_won(&self) -> bool {
        self.state.borrow().as_ref().is_some_and(GameState::is_won)
    }

    pub fn mistakes(&self) -> usize {
        self.state.borrow().as_ref().map_or(0, GameState::mistakes)
    }
}

impl QuartetGame {
    fn with_game<T>(
        &self,
        f: impl FnOnce(&mut GameState) -> Result<T, JsValue>,
    ) -> Result<T, JsValue> {
        let mut state = self.state.borrow_mut();
        let game = state.as_mut().ok_or_else(|| JsValue::from_str("no board yet"))?;
        f(game)
    }
}
