use js_sys::{Function, Reflect, JSON};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use reel_carousel_core::ids::IdAllocator;
use reel_carousel_core::{
    slide_offset_percent, BarColor, Breakpoint, Breakpoints, Carousel, CarouselEvent,
    CarouselHost, Config, DotWidth, HeroConfig, HeroVideo, MediaArena, MediaElement, MediaError,
    Outputs, ProgressChange, SlideAnimator, SlideRegistry, TickToken, Ticker,
};

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn js_error_text(e: &JsValue) -> String {
    e.as_string()
        .or_else(|| {
            Reflect::get(e, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{e:?}"))
}

/// Look up `name` on the host object; `None` when absent.
fn host_method(host: &JsValue, name: &str) -> Result<Option<Function>, JsError> {
    let val = Reflect::get(host, &JsValue::from_str(name))
        .map_err(|e| JsError::new(&format!("host.{name}: {}", js_error_text(&e))))?;
    if jsvalue_is_undefined_or_null(&val) {
        return Ok(None);
    }
    val.dyn_into::<Function>()
        .map(Some)
        .map_err(|_| JsError::new(&format!("host.{name} is not a function")))
}

fn required_method(host: &JsValue, name: &str) -> Result<Function, JsError> {
    host_method(host, name)?.ok_or_else(|| JsError::new(&format!("host.{name} is required")))
}

fn index_arg(index: usize) -> JsValue {
    JsValue::from_f64(index as f64)
}

/// One slide's `<video>` reached through the host's `play(i)` / `pause(i)` /
/// `currentTime(i)` callbacks.
#[derive(Clone)]
struct JsMedia {
    index: usize,
    this: JsValue,
    play: Function,
    pause: Function,
    current_time: Function,
}

impl JsMedia {
    fn run(&self, f: &Function, command: &str) -> Result<(), MediaError> {
        f.call1(&self.this, &index_arg(self.index))
            .map(|_| ())
            .map_err(|e| MediaError::CommandFailed {
                index: self.index,
                command: command.to_string(),
                reason: js_error_text(&e),
            })
    }
}

impl MediaElement for JsMedia {
    fn play(&mut self) -> Result<(), MediaError> {
        self.run(&self.play, "play")
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        self.run(&self.pause, "pause")
    }

    fn current_time(&self) -> f64 {
        self.current_time
            .call1(&self.this, &index_arg(self.index))
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(f64::NAN)
    }
}

/// `subscribeTick(token)` / `unsubscribeTick(token)`; tokens are allocated here.
struct JsTicker {
    this: JsValue,
    subscribe: Function,
    unsubscribe: Function,
    ids: IdAllocator,
}

impl Ticker for JsTicker {
    fn subscribe(&mut self) -> TickToken {
        let token = self.ids.alloc_tick();
        if let Err(e) = self
            .subscribe
            .call1(&self.this, &JsValue::from_f64(token.0 as f64))
        {
            log::warn!("subscribeTick({}) threw: {}", token.0, js_error_text(&e));
        }
        token
    }

    fn unsubscribe(&mut self, token: TickToken) {
        if let Err(e) = self
            .unsubscribe
            .call1(&self.this, &JsValue::from_f64(token.0 as f64))
        {
            log::warn!("unsubscribeTick({}) threw: {}", token.0, js_error_text(&e));
        }
    }
}

struct JsAnimator {
    this: JsValue,
    scroll_to: Function,
    arm_trigger: Option<Function>,
}

impl SlideAnimator for JsAnimator {
    fn scroll_to(&mut self, index: usize) {
        if let Err(e) = self.scroll_to.call1(&self.this, &index_arg(index)) {
            log::warn!("scrollTo({index}) threw: {}", js_error_text(&e));
        }
    }

    fn arm_visibility_trigger(&mut self, index: usize) {
        let Some(f) = &self.arm_trigger else {
            return;
        };
        if let Err(e) = f.call1(&self.this, &index_arg(index)) {
            log::warn!("armTrigger({index}) threw: {}", js_error_text(&e));
        }
    }
}

struct JsHost {
    media: MediaArena<JsMedia>,
    ticker: JsTicker,
    animator: JsAnimator,
    viewport_width: Option<Function>,
    this: JsValue,
    breakpoints: Breakpoints,
}

impl JsHost {
    fn from_js(host: JsValue, slide_count: usize, breakpoints: Breakpoints) -> Result<Self, JsError> {
        if jsvalue_is_undefined_or_null(&host) {
            return Err(JsError::new("host object is null/undefined"));
        }
        let play = required_method(&host, "play")?;
        let pause = required_method(&host, "pause")?;
        let current_time = required_method(&host, "currentTime")?;

        let mut media = MediaArena::with_len(slide_count);
        for index in 0..slide_count {
            media
                .attach(
                    index,
                    JsMedia {
                        index,
                        this: host.clone(),
                        play: play.clone(),
                        pause: pause.clone(),
                        current_time: current_time.clone(),
                    },
                )
                .map_err(|e| JsError::new(&e.to_string()))?;
        }

        Ok(JsHost {
            media,
            ticker: JsTicker {
                this: host.clone(),
                subscribe: required_method(&host, "subscribeTick")?,
                unsubscribe: required_method(&host, "unsubscribeTick")?,
                ids: IdAllocator::new(),
            },
            animator: JsAnimator {
                this: host.clone(),
                scroll_to: required_method(&host, "scrollTo")?,
                arm_trigger: host_method(&host, "armTrigger")?,
            },
            viewport_width: host_method(&host, "viewportWidth")?,
            this: host,
            breakpoints,
        })
    }

    fn template(&self) -> Option<JsMedia> {
        (0..self.media.len()).find_map(|i| self.media.get(i).cloned())
    }
}

impl CarouselHost for JsHost {
    fn media(&mut self, index: usize) -> Option<&mut dyn MediaElement> {
        self.media
            .get_mut(index)
            .map(|m| m as &mut dyn MediaElement)
    }

    fn ticker(&mut self) -> &mut dyn Ticker {
        &mut self.ticker
    }

    fn animator(&mut self) -> &mut dyn SlideAnimator {
        &mut self.animator
    }

    fn breakpoint(&self) -> Breakpoint {
        let width = self
            .viewport_width
            .as_ref()
            .and_then(|f| f.call0(&self.this).ok())
            .and_then(|v| v.as_f64());
        match width {
            Some(w) if w.is_finite() && w >= 0.0 => Breakpoint::classify(w as u32, &self.breakpoints),
            _ => Breakpoint::Wide,
        }
    }
}

/// CSS values the page uses for the indicator dots.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressStyle {
    pub resting_width: String,
    pub narrow_width: String,
    pub medium_width: String,
    pub wide_width: String,
    pub active_color: String,
    pub inactive_color: String,
}

impl Default for ProgressStyle {
    fn default() -> Self {
        Self {
            resting_width: "12px".into(),
            narrow_width: "10vw".into(),
            medium_width: "10vw".into(),
            wide_width: "4vw".into(),
            active_color: "white".into(),
            inactive_color: "#afafaf".into(),
        }
    }
}

/// A single inline-style write. The `dot` container only ever receives a
/// width; the inner `bar` receives its fill width and color.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StyleChange {
    pub index: usize,
    pub target: &'static str,
    pub property: &'static str,
    pub value: String,
}

impl ProgressStyle {
    fn color(&self, color: BarColor) -> &str {
        match color {
            BarColor::Active => &self.active_color,
            BarColor::Inactive => &self.inactive_color,
        }
    }

    fn width(&self, width: DotWidth) -> &str {
        match width {
            DotWidth::Resting => &self.resting_width,
            DotWidth::Expanded(Breakpoint::Narrow) => &self.narrow_width,
            DotWidth::Expanded(Breakpoint::Medium) => &self.medium_width,
            DotWidth::Expanded(Breakpoint::Wide) => &self.wide_width,
        }
    }

    pub fn styles(&self, changes: &[ProgressChange]) -> Vec<StyleChange> {
        let mut out = Vec::with_capacity(changes.len() * 2);
        for change in changes {
            match *change {
                ProgressChange::DotWidth { index, width } => out.push(StyleChange {
                    index,
                    target: "dot",
                    property: "width",
                    value: self.width(width).to_string(),
                }),
                ProgressChange::Bar {
                    index,
                    percent,
                    color,
                } => {
                    out.push(StyleChange {
                        index,
                        target: "bar",
                        property: "width",
                        value: format!("{percent}%"),
                    });
                    out.push(StyleChange {
                        index,
                        target: "bar",
                        property: "background-color",
                        value: self.color(color).to_string(),
                    });
                }
                ProgressChange::Recolor { index, color } => out.push(StyleChange {
                    index,
                    target: "bar",
                    property: "background-color",
                    value: self.color(color).to_string(),
                }),
            }
        }
        out
    }
}

/// `Outputs` plus the inline styles derived from its progress changes.
#[derive(Serialize)]
struct FrameOut<'a> {
    changes: &'a [ProgressChange],
    events: &'a [CarouselEvent],
    styles: Vec<StyleChange>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct WasmConfig {
    #[serde(flatten)]
    core: Config,
    style: ProgressStyle,
}

#[wasm_bindgen]
pub struct ReelCarousel {
    core: Carousel,
    host: JsHost,
    style: ProgressStyle,
}

fn emit(out: &Outputs, style: &ProgressStyle) -> Result<JsValue, JsError> {
    let frame = FrameOut {
        changes: &out.changes,
        events: &out.events,
        styles: style.styles(&out.changes),
    };
    swb::to_value(&frame).map_err(|e| JsError::new(&format!("outputs error: {e}")))
}

#[wasm_bindgen]
impl ReelCarousel {
    /// Create a carousel for `deck` (`{ slides: [...] }` or a bare array).
    ///
    /// `host` must provide `play(i)`, `pause(i)`, `currentTime(i)`,
    /// `subscribeTick(token)`, `unsubscribeTick(token)` and `scrollTo(i)`;
    /// `armTrigger(i)` and `viewportWidth()` are optional. `config` may be
    /// undefined/null for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(deck: JsValue, host: JsValue, config: JsValue) -> Result<ReelCarousel, JsError> {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        let cfg: WasmConfig = if jsvalue_is_undefined_or_null(&config) {
            WasmConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        if jsvalue_is_undefined_or_null(&deck) {
            return Err(JsError::new("deck is null/undefined"));
        }
        let text = JSON::stringify(&deck)
            .map_err(|e| JsError::new(&format!("deck stringify error: {}", js_error_text(&e))))?
            .as_string()
            .ok_or_else(|| JsError::new("deck: stringify produced non-string"))?;
        let registry =
            SlideRegistry::from_json(&text).map_err(|e| JsError::new(&format!("deck error: {e}")))?;

        let host = JsHost::from_js(host, registry.len(), cfg.core.breakpoints)?;
        Ok(ReelCarousel {
            core: Carousel::new(registry, cfg.core),
            host,
            style: cfg.style,
        })
    }

    #[wasm_bindgen]
    pub fn on_slide_visible(&mut self) -> Result<JsValue, JsError> {
        let out = self.core.on_slide_visible(&mut self.host);
        emit(out, &self.style)
    }

    #[wasm_bindgen]
    pub fn on_metadata_ready(&mut self, index: u32) -> Result<JsValue, JsError> {
        let out = self.core.on_metadata_ready(index as usize, &mut self.host);
        emit(out, &self.style)
    }

    #[wasm_bindgen]
    pub fn on_video_ended(&mut self, index: u32) -> Result<JsValue, JsError> {
        let out = self.core.on_video_ended(index as usize, &mut self.host);
        emit(out, &self.style)
    }

    #[wasm_bindgen]
    pub fn on_toggle(&mut self) -> Result<JsValue, JsError> {
        let out = self.core.on_toggle(&mut self.host);
        emit(out, &self.style)
    }

    #[wasm_bindgen]
    pub fn on_control_click(&mut self) -> Result<JsValue, JsError> {
        let out = self.core.on_control_click(&mut self.host);
        emit(out, &self.style)
    }

    #[wasm_bindgen]
    pub fn on_video_started_naturally(&mut self) -> Result<JsValue, JsError> {
        let out = self.core.on_video_started_naturally(&mut self.host);
        emit(out, &self.style)
    }

    /// Call once per animation frame while subscribed.
    #[wasm_bindgen]
    pub fn on_tick(&mut self) -> Result<JsValue, JsError> {
        let out = self.core.on_tick(&mut self.host);
        emit(out, &self.style)
    }

    #[wasm_bindgen]
    pub fn shutdown(&mut self) -> Result<JsValue, JsError> {
        let out = self.core.shutdown(&mut self.host);
        emit(out, &self.style)
    }

    /// Forget slide `index`'s element (unmounted); commands for it fail soft.
    #[wasm_bindgen]
    pub fn detach_media(&mut self, index: u32) -> bool {
        self.host.media.detach(index as usize).is_some()
    }

    /// Re-attach slide `index` using the host callbacks.
    #[wasm_bindgen]
    pub fn attach_media(&mut self, index: u32) -> Result<(), JsError> {
        let index = index as usize;
        let Some(mut media) = self.host.template() else {
            return Err(JsError::new("no media callbacks left to attach"));
        };
        media.index = index;
        self.host
            .media
            .attach(index, media)
            .map(|_| ())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, JsError> {
        swb::to_value(self.core.state()).map_err(|e| JsError::new(&format!("state error: {e}")))
    }

    #[wasm_bindgen]
    pub fn phase(&self) -> String {
        self.core.phase().name().to_string()
    }

    #[wasm_bindgen]
    pub fn current_index(&self) -> u32 {
        self.core.current_index() as u32
    }

    #[wasm_bindgen]
    pub fn is_ticking(&self) -> bool {
        self.core.is_ticking()
    }

    /// `{ icon, action }` for the control button.
    #[wasm_bindgen]
    pub fn control(&self) -> Result<JsValue, JsError> {
        swb::to_value(&self.core.control())
            .map_err(|e| JsError::new(&format!("control error: {e}")))
    }

    #[wasm_bindgen]
    pub fn indicator_dots(&self) -> Result<JsValue, JsError> {
        swb::to_value(&self.core.indicator_dots())
            .map_err(|e| JsError::new(&format!("dots error: {e}")))
    }

    /// Slider transform for the current slide, e.g. `translateX(-200%)`.
    #[wasm_bindgen]
    pub fn slide_transform(&self) -> String {
        format!(
            "translateX({}%)",
            slide_offset_percent(self.core.current_index())
        )
    }
}

/// Hero loop source picker.
#[wasm_bindgen]
pub struct ReelHero {
    core: HeroVideo,
}

#[wasm_bindgen]
impl ReelHero {
    /// `sources` is `{ large, small }`; `config` is an optional `HeroConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(sources: JsValue, config: JsValue) -> Result<ReelHero, JsError> {
        let cfg: HeroConfig = if jsvalue_is_undefined_or_null(&config) {
            HeroConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("hero config error: {e}")))?
        };
        let hero: HeroVideo = swb::from_value(sources)
            .map_err(|e| JsError::new(&format!("hero sources error: {e}")))?;
        Ok(ReelHero {
            core: HeroVideo::new(hero.large, hero.small, cfg),
        })
    }

    /// Source URL for the first render.
    #[wasm_bindgen]
    pub fn mount(&mut self, width: u32) -> String {
        self.core.mount(width).to_string()
    }

    /// New source URL, or undefined when the selection is unchanged.
    #[wasm_bindgen]
    pub fn on_resize(&mut self, width: u32) -> Option<String> {
        self.core.on_resize(width).map(str::to_string)
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_map_breakpoints_and_colors() {
        let style = ProgressStyle::default();
        let styles = style.styles(&[
            ProgressChange::DotWidth {
                index: 1,
                width: DotWidth::Expanded(Breakpoint::Wide),
            },
            ProgressChange::Bar {
                index: 1,
                percent: 42,
                color: BarColor::Active,
            },
            ProgressChange::Recolor {
                index: 0,
                color: BarColor::Inactive,
            },
        ]);
        let values: Vec<&str> = styles.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["4vw", "42%", "white", "#afafaf"]);
        let targets: Vec<(&str, &str)> = styles.iter().map(|s| (s.target, s.property)).collect();
        assert_eq!(
            targets,
            vec![
                ("dot", "width"),
                ("bar", "width"),
                ("bar", "background-color"),
                ("bar", "background-color"),
            ]
        );
    }

    #[test]
    fn narrow_and_medium_share_width() {
        let style = ProgressStyle::default();
        assert_eq!(style.width(DotWidth::Expanded(Breakpoint::Narrow)), "10vw");
        assert_eq!(style.width(DotWidth::Expanded(Breakpoint::Medium)), "10vw");
        assert_eq!(style.width(DotWidth::Resting), "12px");
    }

    #[test]
    fn wasm_config_reads_core_and_style_fields() {
        let cfg: WasmConfig = serde_json::from_str(
            r##"{"min_ready_slides":2,"style":{"active_color":"#fff"}}"##,
        )
        .unwrap();
        assert_eq!(cfg.core.min_ready_slides, 2);
        assert_eq!(cfg.style.active_color, "#fff");
        assert_eq!(cfg.style.wide_width, "4vw");
    }
}
