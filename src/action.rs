//! The fixed universe of gameplay [`Action`]s and the [`InputContext`]s that gate them.

use bevy::reflect::Reflect;
use serde::{Deserialize, Serialize};

/// A logical input event, decoupled from the physical controls that trigger it.
///
/// The set of actions is fixed at compile time: bindings can be changed at runtime,
/// but new actions can never be introduced.
///
/// Actions are small, `Copy` tokens, so the APIs in this crate accept them by value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Reflect,
)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    // Movement
    /// Walk forward, paired with [`Action::MoveBackward`]
    MoveForward,
    /// Walk backward
    MoveBackward,
    /// Strafe left, paired with [`Action::MoveRight`]
    MoveLeft,
    /// Strafe right
    MoveRight,
    /// Jump
    Jump,
    /// Run while held
    Sprint,
    /// Crouch while held
    Crouch,
    // Abilities
    /// Use whatever is in front of the player
    Interact,
    /// Fire the equipped weapon
    Fire,
    /// Aim down sights
    Aim,
    /// Fire the grappling hook
    Grapple,
    /// Reload the equipped weapon
    Reload,
    /// Turn the camera with the pointer
    Look,
    /// Open the inventory
    Inventory,
    // Menus and UI
    /// Open or close the pause menu
    ToggleMenu,
    /// Confirm the focused UI element
    UiConfirm,
    /// Leave the current UI screen
    UiBack,
    /// Advance to the next line of dialog
    DialogAdvance,
    /// Skip the playing cutscene
    SkipCutscene,
    // Vehicles
    /// Throttle up, paired with [`Action::Brake`]
    Accelerate,
    /// Brake, or reverse once stopped
    Brake,
    /// Steer left, paired with [`Action::SteerRight`]
    SteerLeft,
    /// Steer right
    SteerRight,
    /// Leave the current vehicle
    ExitVehicle,
}

impl Action {
    /// Every action, in the order they were defined.
    pub const ALL: [Action; 24] = [
        Action::MoveForward,
        Action::MoveBackward,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Jump,
        Action::Sprint,
        Action::Crouch,
        Action::Interact,
        Action::Fire,
        Action::Aim,
        Action::Grapple,
        Action::Reload,
        Action::Look,
        Action::Inventory,
        Action::ToggleMenu,
        Action::UiConfirm,
        Action::UiBack,
        Action::DialogAdvance,
        Action::SkipCutscene,
        Action::Accelerate,
        Action::Brake,
        Action::SteerLeft,
        Action::SteerRight,
        Action::ExitVehicle,
    ];

    /// The number of variants of this action type
    pub const N_VARIANTS: usize = Self::ALL.len();

    /// Iterates over the possible actions in the order they were defined
    pub fn variants() -> impl ExactSizeIterator<Item = Action> {
        Self::ALL.into_iter()
    }

    /// The stable, kebab-case name of this action, as used in saved bindings.
    pub const fn name(self) -> &'static str {
        match self {
            Action::MoveForward => "move-forward",
            Action::MoveBackward => "move-backward",
            Action::MoveLeft => "move-left",
            Action::MoveRight => "move-right",
            Action::Jump => "jump",
            Action::Sprint => "sprint",
            Action::Crouch => "crouch",
            Action::Interact => "interact",
            Action::Fire => "fire",
            Action::Aim => "aim",
            Action::Grapple => "grapple",
            Action::Reload => "reload",
            Action::Look => "look",
            Action::Inventory => "inventory",
            Action::ToggleMenu => "toggle-menu",
            Action::UiConfirm => "ui-confirm",
            Action::UiBack => "ui-back",
            Action::DialogAdvance => "dialog-advance",
            Action::SkipCutscene => "skip-cutscene",
            Action::Accelerate => "accelerate",
            Action::Brake => "brake",
            Action::SteerLeft => "steer-left",
            Action::SteerRight => "steer-right",
            Action::ExitVehicle => "exit-vehicle",
        }
    }

    /// What kind of value does this action carry when it fires?
    pub const fn input_control_kind(self) -> InputControlKind {
        match self {
            Action::MoveForward
            | Action::MoveBackward
            | Action::MoveLeft
            | Action::MoveRight
            | Action::Accelerate
            | Action::Brake
            | Action::SteerLeft
            | Action::SteerRight => InputControlKind::Axis,
            Action::Look => InputControlKind::DualAxis,
            _ => InputControlKind::Button,
        }
    }

    /// The movement pair this action belongs to, if any.
    pub fn axis_pair(self) -> Option<AxisPair> {
        AxisPair::ALL
            .into_iter()
            .find(|pair| pair.positive == self || pair.negative == self)
    }
}

/// The kind of value an [`Action`] carries to its handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum InputControlKind {
    /// A simple digital action: pressed or released, with no payload.
    Button,
    /// One half of a movement pair, carrying a signed axis value.
    Axis,
    /// A two-dimensional action, such as a camera look, carrying a vector.
    DualAxis,
}

/// Two opposing [`Action`]s that together drive a single movement axis.
///
/// The axis is `+1` when only the `positive` action's controls are pressed,
/// `-1` when only the `negative` action's controls are pressed, and `0` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct AxisPair {
    /// The action that pushes the axis towards `+1`
    pub positive: Action,
    /// The action that pushes the axis towards `-1`
    pub negative: Action,
}

impl AxisPair {
    /// Forward / backward on foot
    pub const FORWARD: AxisPair = AxisPair::new(Action::MoveForward, Action::MoveBackward);
    /// Right / left on foot
    pub const STRAFE: AxisPair = AxisPair::new(Action::MoveRight, Action::MoveLeft);
    /// Throttle / brake in a vehicle
    pub const THROTTLE: AxisPair = AxisPair::new(Action::Accelerate, Action::Brake);
    /// Right / left steering in a vehicle
    pub const STEERING: AxisPair = AxisPair::new(Action::SteerRight, Action::SteerLeft);

    /// Every known movement pair.
    pub const ALL: [AxisPair; 4] = [
        AxisPair::FORWARD,
        AxisPair::STRAFE,
        AxisPair::THROTTLE,
        AxisPair::STEERING,
    ];

    /// Creates a new pair from its two opposing actions.
    pub const fn new(positive: Action, negative: Action) -> Self {
        Self { positive, negative }
    }

    /// The sign of `action` along this axis: `1.0` for the positive action, `-1.0` for the negative one.
    pub fn sign_of(&self, action: Action) -> Option<f32> {
        if action == self.positive {
            Some(1.0)
        } else if action == self.negative {
            Some(-1.0)
        } else {
            None
        }
    }
}

/// A mode of interaction, used to gate which bindings are currently live.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Reflect,
)]
#[serde(rename_all = "lowercase")]
pub enum InputContext {
    /// On-foot gameplay
    Player,
    /// Driving or piloting
    Vehicle,
    /// In-game UI widgets
    Ui,
    /// The pause / main menu
    Menu,
    /// Conversations
    Dialog,
    /// Non-interactive sequences
    Cutscene,
}

impl InputContext {
    /// Every context, in the order they were defined.
    pub const ALL: [InputContext; 6] = [
        InputContext::Player,
        InputContext::Vehicle,
        InputContext::Ui,
        InputContext::Menu,
        InputContext::Dialog,
        InputContext::Cutscene,
    ];

    /// The lower-case name of this context, as used in saved bindings.
    pub const fn name(self) -> &'static str {
        match self {
            InputContext::Player => "player",
            InputContext::Vehicle => "vehicle",
            InputContext::Ui => "ui",
            InputContext::Menu => "menu",
            InputContext::Dialog => "dialog",
            InputContext::Cutscene => "cutscene",
        }
    }
}
