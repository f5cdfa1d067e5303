//! GLSL sources shared by the unit tests.

pub(crate) const VERTEX: &str = r#"#version 450
layout(location = 0) in vec2 aPosition;
layout(location = 0) out vec2 vUv;

void main() {
    vUv = aPosition * 0.5 + 0.5;
    gl_Position = vec4(aPosition, 0.0, 1.0);
}
"#;

pub(crate) const FRAGMENT_PLAIN: &str = r#"#version 450
layout(location = 0) in vec2 vUv;
layout(location = 0) out vec4 fragColor;

layout(set = 0, binding = 0) uniform FrameUniforms {
    float uTime;
    vec2 uResolution;
};

void main() {
    vec2 p = gl_FragCoord.xy / uResolution;
    fragColor = vec4(p, 0.5 + 0.5 * sin(uTime), 1.0);
}
"#;

pub(crate) const FRAGMENT_ORBIT: &str = r#"#version 450
layout(location = 0) in vec2 vUv;
layout(location = 0) out vec4 fragColor;

layout(set = 0, binding = 0) uniform FrameUniforms {
    float uTime;
    vec2 uResolution;
    float uRotationX;
    float uRotationY;
};

void main() {
    vec2 p = vUv - 0.5;
    float c = cos(uRotationY);
    float s = sin(uRotationY);
    p = vec2(c * p.x - s * p.y, s * p.x + c * p.y);
    fragColor = vec4(p + 0.5, 0.5 + 0.5 * sin(uTime + uRotationX), 1.0);
}
"#;

pub(crate) const FRAGMENT_SYNTAX_ERROR: &str = r#"#version 450
layout(location = 0) out vec4 fragColor;

void main() {
    fragColor = vec4(1.0, 0.0, 0.0 1.0);
}
"#;

pub(crate) const FRAGMENT_UNDECLARED: &str = r#"#version 450
layout(location = 0) out vec4 fragColor;

void main() {
    fragColor = vec4(uNotDeclared);
}
"#;

pub(crate) const FRAGMENT_UNMATCHED_INPUT: &str = r#"#version 450
layout(location = 3) in vec3 vNormal;
layout(location = 0) out vec4 fragColor;

void main() {
    fragColor = vec4(normalize(vNormal), 1.0);
}
"#;

pub(crate) const FRAGMENT_WIDER_INPUT: &str = r#"#version 450
layout(location = 0) in vec3 vUv;
layout(location = 0) out vec4 fragColor;

void main() {
    fragColor = vec4(vUv, 1.0);
}
"#;

pub(crate) const FRAGMENT_FLAT_INPUT: &str = r#"#version 450
layout(location = 0) flat in vec2 vUv;
layout(location = 0) out vec4 fragColor;

void main() {
    fragColor = vec4(vUv, 0.0, 1.0);
}
"#;
