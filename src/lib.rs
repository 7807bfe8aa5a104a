// src/lib.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[LIB]Xyn>=====S===t===u===d===i===o===s======[R|$>

// Core modules
pub mod aproar;
pub mod config;
pub mod constants;
pub mod omnixtracker;
pub mod problems;
pub mod vqa;

// Re-exports for convenient access
pub use aproar::{
    ntm::{
        AddressingMechanism,
        Controller,
        ControllerType,
        Interface,
        Memory,
        NTMCell,
        NTMState,
        ReadHead,
        WriteHead,
        NTM,
    },
    EpisodeRunner,
    EpisodeStats,
};

pub use config::{
    AppContext,
    CurriculumConfig,
    NTMConfig,
    ProblemConfig,
    VqaConfig,
};

pub use omnixtracker::{
    NTMError,
    OmniXError,
    OmniXMetry,
};

pub use problems::{
    BatchGenerator,
    Curriculum,
    DataTuple,
    DualSerialReverseRecall,
    ProblemKind,
    ReverseRecall,
    SerialRecall,
};

pub use vqa::{
    Question,
    StackedAttentionVQA,
    VqaOutput,
};
